//! Command-line front end: parses dashboard commands and drives the pages.

mod exec;
mod repl;

pub use exec::execute;
pub use repl::run_repl;

use crate::api::resources::{ProductDraft, ProductImage, ProductPatch};
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Login { email: String, password: String },
    Logout,
    Whoami,
    Open(String),
    Products,
    AddProduct(ProductDraft),
    EditProduct { id: String, patch: ProductPatch },
    DeleteProduct(String),
    TogglePopular(String),
    Announcements,
    Announce(String),
    DeleteAnnouncement(String),
    Orders,
    SetStatus { id: String, status: String },
    Help,
    Quit,
}

pub fn usage(program: &str) -> String {
    format!(
        "Usage:\n  {program} [--api-url <url>] [--session-dir <dir>] <command> [args...]\n  {program} [--api-url <url>] [--session-dir <dir>] --repl\n\n\
Flags:\n  --api-url <url>          Storefront API base URL (env STOREFRONT_API_URL)\n  --session-dir <dir>      Directory holding the saved session (env STOREFRONT_SESSION_DIR)\n  --repl                   Start interactive mode\n  -h, --help               Show this help\n\n\
Commands:\n  login <email> <password>                 log in and save the session\n  logout                                   forget the saved session\n  whoami                                   show the saved session\n  open <path>                              open a page (/, /login, /add-product, /edit-product/<id>, /addAnnouncement)\n  products                                 list products\n  add-product key=value...                 create a product (name, price, description, category, brand, weight, url, image=<url>|<label>)\n  edit-product <id> key=value...           update a product (name, price, description, category, brand, popular)\n  delete-product <id>                      delete a product\n  toggle-popular <id>                      flip a product's popular flag\n  announcements                            list announcements and orders\n  announce <message>                       publish an announcement\n  delete-announcement <id>                 delete an announcement\n  orders                                   list orders\n  set-status <order-id> <status>           change an order's status\n  help                                     show this help\n  quit | exit                              leave the interpreter\n\n\
Values containing spaces can be double-quoted: announce \"Free shipping this week\""
    )
}

/// Split a command line on whitespace, keeping double-quoted runs together.
pub fn tokenize(line: &str) -> AppResult<Vec<String>> {
    let mut out = Vec::new();
    let mut cur = String::new();
    let mut in_quotes = false;
    let mut has_token = false;
    let mut chars = line.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                has_token = true;
            }
            '\\' if in_quotes => {
                if let Some(next) = chars.next() {
                    cur.push(next);
                }
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_token {
                    out.push(std::mem::take(&mut cur));
                    has_token = false;
                }
            }
            c => {
                cur.push(c);
                has_token = true;
            }
        }
    }
    if in_quotes {
        return Err(AppError::user("unterminated_quote", "missing closing quote"));
    }
    if has_token {
        out.push(cur);
    }
    Ok(out)
}

fn need<'a>(args: &'a [String], idx: usize, what: &str, cmd: &str) -> AppResult<&'a str> {
    args.get(idx)
        .map(|s| s.as_str())
        .ok_or_else(|| AppError::user("missing_argument", format!("{} requires {}", cmd, what)))
}

fn key_values(args: &[String]) -> AppResult<Vec<(String, String)>> {
    args.iter()
        .map(|a| {
            let (k, v) = a
                .split_once('=')
                .ok_or_else(|| AppError::user("invalid_argument", format!("expected key=value, got '{}'", a)))?;
            Ok((k.trim().to_ascii_lowercase(), v.to_string()))
        })
        .collect()
}

fn parse_image(raw: &str) -> ProductImage {
    match raw.split_once('|') {
        Some((url, label)) => ProductImage { url: url.trim().to_string(), label: label.trim().to_string() },
        None => ProductImage { url: raw.trim().to_string(), label: String::new() },
    }
}

fn parse_draft(args: &[String]) -> AppResult<ProductDraft> {
    let mut d = ProductDraft::default();
    for (k, v) in key_values(args)? {
        match k.as_str() {
            "name" => d.name = v,
            "price" => d.price = v,
            "description" => d.description = v,
            "category" => d.category = v,
            "brand" => d.brand = v,
            "weight" => d.weight = v,
            "url" | "source_url" | "cnfansurl" => d.source_url = v,
            "image" => d.images.push(parse_image(&v)),
            other => return Err(AppError::user("unknown_field", format!("unknown product field '{}'", other))),
        }
    }
    Ok(d)
}

fn parse_patch(args: &[String]) -> AppResult<ProductPatch> {
    let mut p = ProductPatch::default();
    for (k, v) in key_values(args)? {
        match k.as_str() {
            "name" => p.name = Some(v),
            "price" => {
                let price = v
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|x| x.is_finite() && *x >= 0.0)
                    .ok_or_else(|| AppError::user("invalid_price", format!("price must be a number, got '{}'", v)))?;
                p.price = Some(price);
            }
            "description" => p.description = Some(v),
            "category" => p.category = Some(v.to_lowercase()),
            "brand" => p.brand = Some(v.to_lowercase()),
            "popular" => {
                let flag = match v.trim().to_ascii_lowercase().as_str() {
                    "true" | "yes" | "1" => true,
                    "false" | "no" | "0" => false,
                    _ => return Err(AppError::user("invalid_popular", format!("popular must be true or false, got '{}'", v))),
                };
                p.popular = Some(flag);
            }
            other => return Err(AppError::user("unknown_field", format!("unknown product field '{}'", other))),
        }
    }
    Ok(p)
}

pub fn parse_command(args: &[String]) -> AppResult<Command> {
    let Some(head) = args.first() else {
        return Err(AppError::user("empty_command", "no command given"));
    };
    let cmd = head.to_ascii_lowercase();
    let rest = &args[1..];
    let parsed = match cmd.as_str() {
        "login" => Command::Login {
            email: need(rest, 0, "<email>", "login")?.to_string(),
            password: need(rest, 1, "<password>", "login")?.to_string(),
        },
        "logout" => Command::Logout,
        "whoami" => Command::Whoami,
        "open" => Command::Open(need(rest, 0, "<path>", "open")?.to_string()),
        "products" => Command::Products,
        "add-product" => Command::AddProduct(parse_draft(rest)?),
        "edit-product" => Command::EditProduct {
            id: need(rest, 0, "<id>", "edit-product")?.to_string(),
            patch: parse_patch(&rest[1..])?,
        },
        "delete-product" => Command::DeleteProduct(need(rest, 0, "<id>", "delete-product")?.to_string()),
        "toggle-popular" => Command::TogglePopular(need(rest, 0, "<id>", "toggle-popular")?.to_string()),
        "announcements" => Command::Announcements,
        "announce" => {
            if rest.is_empty() {
                return Err(AppError::user("missing_argument", "announce requires <message>"));
            }
            Command::Announce(rest.join(" "))
        }
        "delete-announcement" => Command::DeleteAnnouncement(need(rest, 0, "<id>", "delete-announcement")?.to_string()),
        "orders" => Command::Orders,
        "set-status" => {
            let id = need(rest, 0, "<order-id>", "set-status")?.to_string();
            if rest.len() < 2 {
                return Err(AppError::user("missing_argument", "set-status requires <status>"));
            }
            Command::SetStatus { id, status: rest[1..].join(" ") }
        }
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(AppError::user("unknown_command", format!("unknown command '{}'; try 'help'", other))),
    };
    Ok(parsed)
}
