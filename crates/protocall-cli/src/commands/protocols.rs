//! Protocols command implementation

use std::path::Path;

use crate::cli::ResolverArgs;
use crate::error::Result;

use super::build_resolver;

/// Run the protocols command
pub fn run_protocols(cwd: &Path, args: &ResolverArgs) -> Result<()> {
    let resolver = build_resolver(args, cwd, cwd)?;
    for protocol in resolver.supported_protocols() {
        println!("{protocol}");
    }
    Ok(())
}
