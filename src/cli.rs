use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "jkl",
    about = "A command-line tool version manager",
    long_about = "jkl is a version manager for other command-line tools. It installs tools quickly with \
                  minimal input, and helps you switch versions of tools while you work."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable debug output (also enabled by setting the JKL_DEBUG environment variable to any value)
    #[arg(short = 'D', long, global = true)]
    pub debug: bool,
}

const INSTALL_HELP: &str = "If no version is specified, the latest version will be installed (not including \
pre-release versions). A partial major version will match the latest minor one.

Available providers are:
  github|gh - install a Github release. The source is specified as <Github user>/<Github repository>.
  hashicorp|hashi - install a Hashicorp product. The source is the name of the Hashicorp product.

Examples:
  jkl install github:fairwindsops/rbac-lookup
  jkl install github:fairwindsops/rbac-lookup:0.9.0
  jkl install github:fairwindsops/rbac-lookup:0.8
  jkl install hashicorp:terraform:1.2";

const UNINSTALL_HELP: &str = "A tool version must be exact, as shown by: jkl list <tool name>
If no version is specified, all versions of the tool will be uninstalled.

Examples:
  jkl uninstall rbac-lookup
  jkl uninstall rbac-lookup:0.9.0";

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Install a command-line tool
    #[command(visible_aliases = ["add", "inst", "i"], after_long_help = INSTALL_HELP)]
    Install {
        /// <provider>:<source>[:<version>]
        #[arg(value_name = "PROVIDER:SOURCE[:VERSION]")]
        spec: String,
    },
    /// Uninstall a command-line tool
    #[command(visible_aliases = ["remove", "uninst", "u", "rm"], after_long_help = UNINSTALL_HELP)]
    Uninstall {
        /// <tool name>[:<version>]
        #[arg(value_name = "TOOL[:VERSION]")]
        spec: String,
    },
    /// List installed command-line tools or installed versions for a specific tool
    ///
    /// With no arguments, all tools that jkl has installed are shown. With a tool name, jkl
    /// lists installed versions of that tool.
    #[command(visible_aliases = ["ls", "lis", "l"])]
    List {
        #[arg(value_name = "TOOL")]
        tool: Option<String>,
    },
    /// Display the jkl version and git commit
    #[command(visible_aliases = ["ver", "v"])]
    Version(VersionArgs),
}

#[derive(Args, Debug, Default)]
pub struct VersionArgs {
    /// Only output the jkl version
    #[arg(short = 'v', long, conflicts_with = "commit_only")]
    pub version_only: bool,
    /// Only output the jkl git commit
    #[arg(short = 'c', long)]
    pub commit_only: bool,
}
