//! Shell completion support for metanyx
//!
//! Static completion scripts only: subcommands, flags, enumerated values
//! (`--op`, `--mode`, `--type`) and path hints come straight from the clap
//! definition.

use clap::Command;
use clap_complete::Shell;
use std::io::Write;

/// Generate static shell completions into `buf`
///
/// # Arguments
/// * `shell` - Target shell (bash, zsh, fish, powershell, elvish)
/// * `cmd` - The clap Command to generate completions for
/// * `buf` - Destination, usually stdout
pub fn generate_static<W: Write>(shell: Shell, cmd: &mut Command, buf: &mut W) {
    let name = cmd.get_name().to_string();
    clap_complete::generate(shell, cmd, name, buf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::CommandFactory;

    #[test]
    fn test_bash_script_mentions_subcommands() {
        let mut buf = Vec::new();
        generate_static(Shell::Bash, &mut Cli::command(), &mut buf);
        let script = String::from_utf8(buf).unwrap();
        assert!(script.contains("metanyx"));
        assert!(script.contains("wri"));
        assert!(script.contains("--ctime-touch"));
    }
}
