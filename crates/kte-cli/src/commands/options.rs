use kte_core::error::KteError;

use super::OptionArgs;

pub fn run(args: &OptionArgs) -> Result<(), KteError> {
    let options = args.resolve()?;
    let json = serde_json::to_string_pretty(&options)?;
    println!("{json}");
    Ok(())
}
