/// Entry point for the pipecheck driver.
///
/// Builds the pipeline described by the topology file, attaches the
/// monitor tree, and prints the resulting monitor snapshot and collected
/// reports as JSON.
///
/// # Examples
///
/// ```bash
/// PIPECHECK_TOPOLOGY=pipeline.json PIPECHECK_SCENARIO=seek:pipeline* cargo run
/// ```
fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    pipecheck::run()
}
