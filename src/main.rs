use std::process;

use anyhow::{bail, Context, Result};
use wordbuilder::EvaluationContext;

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let path = match args.next() {
        Some(path) => path,
        None => bail!("usage: wordbuilder <source-file>"),
    };

    let source =
        std::fs::read_to_string(&path).with_context(|| format!("could not read {}", path))?;

    let mut context = EvaluationContext::new();
    match context.evaluate_str(&source) {
        Ok(Some(result)) => println!("{}", result),
        Ok(None) => {}
        Err(errors) => {
            for error in errors.errors() {
                eprintln!("\t{}", error);
            }
            process::exit(1);
        }
    }

    Ok(())
}
