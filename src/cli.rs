use clap::Parser;
use std::path::PathBuf;

use crate::config::Overrides;

/// Serve a directory over HTTP and accept PUT uploads into it
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None, verbatim_doc_comment)]
pub struct Cli {
    /// Port to listen on
    #[arg(value_name = "PORT")]
    pub port: Option<u16>,

    /// Address to bind to
    #[arg(short, long, value_name = "ADDRESS")]
    pub bind: Option<String>,

    /// Directory to serve and write uploads into [default: current directory]
    #[arg(short, long, value_name = "DIR")]
    pub directory: Option<PathBuf>,

    /// Configuration file [default: devserve.toml, if present]
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<String>,

    /// Send Cross-Origin-Opener-Policy / Cross-Origin-Embedder-Policy on every response
    #[arg(long)]
    pub coop: bool,

    /// Let PUT paths with `..` write outside the served directory
    #[arg(long)]
    pub allow_escape: bool,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    pub print_config: bool,
}

impl Cli {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            host: self.bind.clone(),
            port: self.port,
            root: self.directory.clone(),
            inject_coop_headers: self.coop.then_some(true),
            enforce_root: self.allow_escape.then_some(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_arguments() {
        let cli = Cli::try_parse_from(["devserve"]).unwrap();
        let overrides = cli.overrides();
        assert!(overrides.port.is_none());
        assert!(overrides.host.is_none());
        assert!(overrides.inject_coop_headers.is_none());
        assert!(overrides.enforce_root.is_none());
    }

    #[test]
    fn test_all_arguments() {
        let cli = Cli::try_parse_from([
            "devserve", "9000", "--bind", "127.0.0.1", "-d", "/srv/www", "--coop", "--allow-escape",
        ])
        .unwrap();
        let overrides = cli.overrides();
        assert_eq!(overrides.port, Some(9000));
        assert_eq!(overrides.host.as_deref(), Some("127.0.0.1"));
        assert_eq!(overrides.root, Some(PathBuf::from("/srv/www")));
        assert_eq!(overrides.inject_coop_headers, Some(true));
        assert_eq!(overrides.enforce_root, Some(false));
    }

    #[test]
    fn test_rejects_bad_port() {
        assert!(Cli::try_parse_from(["devserve", "70000"]).is_err());
    }
}
