use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use shinf_crypto::INFINITE_DEPTH;

#[derive(Parser)]
#[command(
    name = "shinf",
    about = "SHA-Infinity: iterated hashing, Merkle proofs and hash chains",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// TOML file overriding the default hash configuration
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Iterated hash of a string
    Hash(HashArgs),
    /// Generate a random hex salt
    Salt(SaltArgs),
    /// Salted iterated hash
    Salted(SaltedArgs),
    /// Keyed (HMAC) iterated hash
    Hmac(HmacArgs),
    /// Content address (single plain digest)
    Address(AddressArgs),
    /// Build a Merkle tree over items
    Merkle(MerkleArgs),
    /// Generate a Merkle inclusion proof
    Proof(ProofArgs),
    /// Verify a Merkle inclusion proof read from a JSON file
    Verify(VerifyArgs),
    /// Build a hash chain over items, or verify one read from a JSON file
    Chain(ChainArgs),
    /// Fold several digests into one
    Composite(CompositeArgs),
    /// Hash bound to a timestamp
    Timed(TimedArgs),
    /// Versioned hash string
    Versioned(VersionedArgs),
    /// Parse a versioned hash string
    Parse(ParseArgs),
    /// Hash a file
    File(PathArgs),
    /// Hash a directory tree
    Dir(PathArgs),
}

/// Iteration depth: an integer (clamped to the configured range) or
/// `inf`/`infinite` for the maximum.
pub fn parse_depth(s: &str) -> Result<i64, String> {
    match s {
        "inf" | "infinite" => Ok(INFINITE_DEPTH),
        _ => s
            .parse::<i64>()
            .map_err(|_| format!("invalid depth {s:?}: expected an integer or 'inf'")),
    }
}

#[derive(Args)]
pub struct DepthArg {
    /// Iteration depth (defaults to the configured default depth)
    #[arg(short, long, value_parser = parse_depth, allow_negative_numbers = true)]
    pub depth: Option<i64>,
}

#[derive(Args)]
pub struct HashArgs {
    pub input: String,
    #[command(flatten)]
    pub depth: DepthArg,
}

#[derive(Args)]
pub struct SaltArgs {
    /// Salt length in bytes
    #[arg(short, long, default_value_t = 32)]
    pub length: usize,
}

#[derive(Args)]
pub struct SaltedArgs {
    pub input: String,
    #[arg(long)]
    pub salt: String,
    #[command(flatten)]
    pub depth: DepthArg,
}

#[derive(Args)]
pub struct HmacArgs {
    pub input: String,
    #[arg(long)]
    pub key: String,
    #[command(flatten)]
    pub depth: DepthArg,
}

#[derive(Args)]
pub struct AddressArgs {
    pub input: String,
}

#[derive(Args)]
pub struct MerkleArgs {
    pub items: Vec<String>,
    #[command(flatten)]
    pub depth: DepthArg,
}

#[derive(Args)]
pub struct ProofArgs {
    /// Index of the item to prove
    #[arg(short, long)]
    pub index: usize,
    pub items: Vec<String>,
    #[command(flatten)]
    pub depth: DepthArg,
}

#[derive(Args)]
pub struct VerifyArgs {
    /// Proof JSON as written by `shinf proof --format json`
    pub proof: PathBuf,
    /// Leaf digest to check (defaults to the proof's leaf)
    #[arg(long)]
    pub leaf: Option<String>,
    /// Trusted root of the tree
    #[arg(long)]
    pub root: String,
    /// Trusted number of leaves in the tree
    #[arg(long)]
    pub leaf_count: usize,
}

#[derive(Args)]
pub struct ChainArgs {
    pub items: Vec<String>,
    /// Final digest of the chain being continued
    #[arg(long)]
    pub previous: Option<String>,
    /// Chain JSON as written by `shinf chain --format json` to verify
    #[arg(long, conflicts_with_all = ["items", "previous"])]
    pub verify: Option<PathBuf>,
}

#[derive(Args)]
pub struct CompositeArgs {
    pub hashes: Vec<String>,
    #[command(flatten)]
    pub depth: DepthArg,
}

#[derive(Args)]
pub struct TimedArgs {
    pub input: String,
    /// Epoch milliseconds to reproduce an earlier timed hash
    #[arg(long)]
    pub timestamp: Option<i64>,
    #[command(flatten)]
    pub depth: DepthArg,
}

#[derive(Args)]
pub struct VersionedArgs {
    pub input: String,
    #[command(flatten)]
    pub depth: DepthArg,
}

#[derive(Args)]
pub struct ParseArgs {
    pub value: String,
}

#[derive(Args)]
pub struct PathArgs {
    pub path: PathBuf,
    #[command(flatten)]
    pub depth: DepthArg,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_hash() {
        let cli = Cli::try_parse_from(["shinf", "hash", "hello", "-d", "10"]).unwrap();
        if let Command::Hash(args) = cli.command {
            assert_eq!(args.input, "hello");
            assert_eq!(args.depth.depth, Some(10));
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_hash_default_depth() {
        let cli = Cli::try_parse_from(["shinf", "hash", "hello"]).unwrap();
        if let Command::Hash(args) = cli.command {
            assert_eq!(args.depth.depth, None);
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_infinite_depth() {
        let cli = Cli::try_parse_from(["shinf", "hash", "x", "--depth", "inf"]).unwrap();
        if let Command::Hash(args) = cli.command {
            assert_eq!(args.depth.depth, Some(INFINITE_DEPTH));
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_negative_depth() {
        let cli = Cli::try_parse_from(["shinf", "hash", "x", "-d", "-3"]).unwrap();
        if let Command::Hash(args) = cli.command {
            assert_eq!(args.depth.depth, Some(-3));
        } else { panic!("wrong command"); }
    }

    #[test]
    fn reject_bad_depth() {
        assert!(Cli::try_parse_from(["shinf", "hash", "x", "-d", "deep"]).is_err());
    }

    #[test]
    fn parse_salt_length() {
        let cli = Cli::try_parse_from(["shinf", "salt", "-l", "16"]).unwrap();
        if let Command::Salt(args) = cli.command {
            assert_eq!(args.length, 16);
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_salted() {
        let cli = Cli::try_parse_from(["shinf", "salted", "pw", "--salt", "abcd"]).unwrap();
        if let Command::Salted(args) = cli.command {
            assert_eq!(args.input, "pw");
            assert_eq!(args.salt, "abcd");
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_proof() {
        let cli = Cli::try_parse_from(["shinf", "proof", "-i", "2", "a", "b", "c"]).unwrap();
        if let Command::Proof(args) = cli.command {
            assert_eq!(args.index, 2);
            assert_eq!(args.items, vec!["a", "b", "c"]);
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_chain_with_previous() {
        let cli = Cli::try_parse_from(["shinf", "chain", "e1", "e2", "--previous", "ab"]).unwrap();
        if let Command::Chain(args) = cli.command {
            assert_eq!(args.items, vec!["e1", "e2"]);
            assert_eq!(args.previous, Some("ab".into()));
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_verify_requires_trusted_tree() {
        assert!(Cli::try_parse_from(["shinf", "verify", "p.json"]).is_err());
        assert!(Cli::try_parse_from(["shinf", "verify", "p.json", "--root", "ab"]).is_err());
        let cli = Cli::try_parse_from([
            "shinf", "verify", "p.json", "--root", "ab", "--leaf-count", "3",
        ])
        .unwrap();
        if let Command::Verify(args) = cli.command {
            assert_eq!(args.root, "ab");
            assert_eq!(args.leaf_count, 3);
            assert_eq!(args.leaf, None);
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_chain_verify() {
        let cli = Cli::try_parse_from(["shinf", "chain", "--verify", "chain.json"]).unwrap();
        if let Command::Chain(args) = cli.command {
            assert_eq!(args.verify, Some(PathBuf::from("chain.json")));
            assert!(args.items.is_empty());
        } else { panic!("wrong command"); }
        assert!(Cli::try_parse_from(["shinf", "chain", "e1", "--verify", "chain.json"]).is_err());
    }

    #[test]
    fn parse_dir() {
        let cli = Cli::try_parse_from(["shinf", "dir", "/tmp", "-d", "2"]).unwrap();
        if let Command::Dir(args) = cli.command {
            assert_eq!(args.path, PathBuf::from("/tmp"));
            assert_eq!(args.depth.depth, Some(2));
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_global_flags() {
        let cli = Cli::try_parse_from([
            "shinf", "--verbose", "--format", "json", "--config", "shinf.toml", "address", "x",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.format, OutputFormat::Json));
        assert_eq!(cli.config, Some(PathBuf::from("shinf.toml")));
    }
}
