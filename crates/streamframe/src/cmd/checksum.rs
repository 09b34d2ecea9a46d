use std::fs;

use streamframe_checksum::ChecksumRegistry;

use crate::cmd::ChecksumArgs;
use crate::exit::{io_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_checksum, OutputFormat};

pub fn run(args: ChecksumArgs, format: OutputFormat) -> CliResult<i32> {
    let registry = ChecksumRegistry::new();
    let algorithm = registry.lookup(&args.algorithm).ok_or_else(|| {
        CliError::new(
            USAGE,
            format!(
                "unknown checksum algorithm {:?} (supported: {})",
                args.algorithm,
                registry.supported_algorithms().join(", ")
            ),
        )
    })?;

    let data = resolve_input(&args)?;
    let checksum = registry.checksum(&algorithm, &data, args.seed);
    print_checksum(algorithm.name(), &checksum, format);
    Ok(SUCCESS)
}

fn resolve_input(args: &ChecksumArgs) -> CliResult<Vec<u8>> {
    if let Some(data) = &args.data {
        return Ok(data.as_bytes().to_vec());
    }
    if let Some(path) = &args.file {
        return fs::read(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err));
    }
    Err(CliError::new(USAGE, "one of --data or --file is required"))
}
