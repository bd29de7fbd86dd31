use haven_ai::prompts::system_prompt;
use haven_core::enums::Modality;

use crate::cli::root_commands::PromptArgs;
use crate::commands::shared::parse::parse_enum;

/// Handle `haven prompt`. Prints the prompt text as-is.
pub fn handle(args: &PromptArgs) -> anyhow::Result<()> {
    let modality: Modality = parse_enum(&args.modality, "modality")?;
    println!("{}", system_prompt(modality));
    Ok(())
}
