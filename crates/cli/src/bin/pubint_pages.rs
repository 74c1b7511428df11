use anyhow::Result;

fn main() -> Result<()> {
    pubint_cli::main_entry()
}
