use streamframe_checksum::ChecksumRegistry;

use crate::cmd::AlgorithmsArgs;
use crate::exit::{CliResult, SUCCESS};
use crate::output::{print_algorithms, AlgorithmRow, OutputFormat};

pub fn run(_args: AlgorithmsArgs, format: OutputFormat) -> CliResult<i32> {
    let registry = ChecksumRegistry::new();
    let rows: Vec<AlgorithmRow> = registry
        .supported_algorithms()
        .into_iter()
        .map(|name| {
            let length = registry.length_of(&registry.resolve(&name));
            AlgorithmRow { name, length }
        })
        .collect();

    print_algorithms(&rows, format);
    Ok(SUCCESS)
}
