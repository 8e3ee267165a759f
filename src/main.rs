use epigraph::runner::run_with_args;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    run_with_args()?;
    Ok(())
}
