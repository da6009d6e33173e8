use anyhow::{anyhow, bail, Context};
use catalog::model::ProductDraft;
use rust_decimal::Decimal;

pub const HELP: &str = "\
Commands:
  list                 show the products
  search [term]        filter by name, SKU or description (no term clears)
  inactive             show or hide inactive products
  new                  open the form for a new product
  edit <n>             open the form for product n
  set <field> <value>  fill a form field: name, description, price, sku, active
  save                 submit the form
  cancel               close the form
  toggle <n>           activate or deactivate product n
  delete <n>           delete product n
  help                 show this message
  quit                 exit";

/// A line typed at the console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    Search(String),
    ToggleInactive,
    New,
    Edit(usize),
    Set(Field, String),
    Save,
    Cancel,
    Toggle(usize),
    Delete(usize),
    Help,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Description,
    Price,
    Sku,
    Active,
}

impl Field {
    fn parse(s: &str) -> anyhow::Result<Self> {
        match s.to_lowercase().as_str() {
            "name" => Ok(Field::Name),
            "description" | "desc" => Ok(Field::Description),
            "price" => Ok(Field::Price),
            "sku" => Ok(Field::Sku),
            "active" => Ok(Field::Active),
            other => bail!("Unknown field '{}'", other),
        }
    }

    /// Writes `value` into the matching field of `draft`.
    pub fn apply(self, draft: &mut ProductDraft, value: &str) -> anyhow::Result<()> {
        match self {
            Field::Name => draft.name = value.to_owned(),
            Field::Description => draft.description = value.to_owned(),
            Field::Sku => draft.sku = value.to_owned(),
            Field::Price => draft.price = parse_price(value)?,
            Field::Active => draft.active = parse_flag(value)?,
        }

        Ok(())
    }
}

pub fn parse(line: &str) -> anyhow::Result<Command> {
    let line = line.trim();
    let (name, rest) = match line.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (line, ""),
    };

    let command = match name.to_lowercase().as_str() {
        "" => bail!("Empty command"),
        "list" | "ls" => Command::List,
        "search" => Command::Search(rest.to_owned()),
        "inactive" => Command::ToggleInactive,
        "new" => Command::New,
        "edit" => Command::Edit(position(rest)?),
        "set" => {
            let (field, value) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            if field.is_empty() {
                bail!("Usage: set <field> <value>");
            }
            Command::Set(Field::parse(field)?, value.trim().to_owned())
        }
        "save" => Command::Save,
        "cancel" => Command::Cancel,
        "toggle" => Command::Toggle(position(rest)?),
        "delete" | "rm" => Command::Delete(position(rest)?),
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => bail!("Unknown command '{}', type 'help' for the list", other),
    };

    Ok(command)
}

// Listing positions are 1-based.
fn position(s: &str) -> anyhow::Result<usize> {
    match s.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(anyhow!("Expected a product number, got '{}'", s)),
    }
}

// Accepts both "1234.56" and "1.234,56".
fn parse_price(s: &str) -> anyhow::Result<Decimal> {
    let s = s.trim().trim_start_matches("R$").trim();
    let normalized = if s.contains(',') {
        s.replace('.', "").replace(',', ".")
    } else {
        s.to_owned()
    };

    normalized
        .parse::<Decimal>()
        .with_context(|| format!("Invalid price '{}'", s))
}

fn parse_flag(s: &str) -> anyhow::Result<bool> {
    match s.trim().to_lowercase().as_str() {
        "yes" | "y" | "true" | "on" => Ok(true),
        "no" | "n" | "false" | "off" => Ok(false),
        other => bail!("Expected yes or no, got '{}'", other),
    }
}
