use anyhow::{bail, Context};
use colored::Colorize;
use serde::Serialize;
use serde_json::json;
use shinf_crypto::{generate_salt, ChainVerifier, DeepHasher, HashChain, HashConfig, MerkleProof};
use shinf_types::Digest;
use tracing::debug;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => HashConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => HashConfig::default(),
    };
    let hasher = DeepHasher::new(config)?;
    debug!(
        algorithm = %hasher.algorithm(),
        default_depth = hasher.config().default_depth,
        max_depth = hasher.config().max_depth,
        "hash configuration loaded"
    );
    let json = matches!(cli.format, OutputFormat::Json);

    match cli.command {
        Command::Hash(args) => cmd_hash(&hasher, args, json),
        Command::Salt(args) => cmd_salt(args, json),
        Command::Salted(args) => cmd_salted(&hasher, args, json),
        Command::Hmac(args) => cmd_hmac(&hasher, args, json),
        Command::Address(args) => {
            let digest = hasher.content_address(args.input.as_bytes());
            emit(json, &json!({ "address": digest }), || println!("{}", digest.to_string().cyan()))
        }
        Command::Merkle(args) => cmd_merkle(&hasher, args, json),
        Command::Proof(args) => cmd_proof(&hasher, args, json),
        Command::Verify(args) => cmd_verify(&hasher, args, json),
        Command::Chain(args) => cmd_chain(&hasher, args, json),
        Command::Composite(args) => cmd_composite(&hasher, args, json),
        Command::Timed(args) => cmd_timed(&hasher, args, json),
        Command::Versioned(args) => {
            let versioned = hasher.versioned_hash(args.input.as_bytes(), depth(&hasher, &args.depth));
            emit(json, &json!({ "versioned": versioned }), || println!("{}", versioned.cyan()))
        }
        Command::Parse(args) => {
            let parsed = hasher.parse_versioned_hash(&args.value)?;
            let value = json!({
                "prefix": parsed.prefix,
                "version": parsed.version,
                "depth": parsed.depth,
                "hash": parsed.digest,
            });
            emit(json, &value, || {
                println!("Prefix:  {}", parsed.prefix);
                println!("Version: {}", parsed.version.to_string().yellow());
                println!("Depth:   {}", parsed.depth.to_string().bold());
                println!("Digest:  {}", parsed.digest.to_string().cyan());
            })
        }
        Command::File(args) => {
            let d = depth(&hasher, &args.depth);
            let digest = shinf_fs::hash_file(&hasher, &args.path, d)?;
            print_digest(&hasher, digest, d, json)
        }
        Command::Dir(args) => cmd_dir(&hasher, args, json),
    }
}

/// Requested depth, or the configured default.
fn depth(hasher: &DeepHasher, arg: &DepthArg) -> i64 {
    arg.depth
        .unwrap_or_else(|| i64::from(hasher.config().default_depth))
}

fn emit<T: Serialize>(json: bool, value: &T, text: impl FnOnce()) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        text();
    }
    Ok(())
}

fn parse_digest(s: &str) -> anyhow::Result<Digest> {
    Digest::from_hex(s).with_context(|| format!("invalid digest {s:?}"))
}

fn print_digest(hasher: &DeepHasher, digest: Digest, depth: i64, json: bool) -> anyhow::Result<()> {
    let depth = hasher.normalize_depth(depth);
    let value = json!({
        "hash": digest,
        "depth": depth,
        "algorithm": hasher.algorithm(),
    });
    emit(json, &value, || println!("{}", digest.to_string().cyan()))
}

fn cmd_hash(hasher: &DeepHasher, args: HashArgs, json: bool) -> anyhow::Result<()> {
    let d = depth(hasher, &args.depth);
    print_digest(hasher, hasher.iterated_hash(args.input.as_bytes(), d), d, json)
}

fn cmd_salt(args: SaltArgs, json: bool) -> anyhow::Result<()> {
    let salt = generate_salt(args.length)?;
    emit(json, &json!({ "salt": salt }), || println!("{}", salt.yellow()))
}

fn cmd_salted(hasher: &DeepHasher, args: SaltedArgs, json: bool) -> anyhow::Result<()> {
    let d = depth(hasher, &args.depth);
    let digest = hasher.salted_hash(args.input.as_bytes(), args.salt.as_bytes(), d);
    print_digest(hasher, digest, d, json)
}

fn cmd_hmac(hasher: &DeepHasher, args: HmacArgs, json: bool) -> anyhow::Result<()> {
    let d = depth(hasher, &args.depth);
    let digest = hasher.keyed_hash(args.key.as_bytes(), args.input.as_bytes(), d);
    print_digest(hasher, digest, d, json)
}

fn cmd_merkle(hasher: &DeepHasher, args: MerkleArgs, json: bool) -> anyhow::Result<()> {
    let tree = hasher.build_tree(&args.items, depth(hasher, &args.depth));
    let value = json!({
        "root": tree.root(),
        "leaves": tree.leaves(),
        "levels": tree.levels(),
        "item_count": tree.item_count(),
    });
    emit(json, &value, || {
        println!("Root: {}", tree.root().to_string().cyan().bold());
        for (i, level) in tree.levels().iter().enumerate() {
            println!("  Level {}: {} node(s)", i, level.len());
            for node in level {
                println!("    {}", node.to_string().dimmed());
            }
        }
    })
}

fn cmd_proof(hasher: &DeepHasher, args: ProofArgs, json: bool) -> anyhow::Result<()> {
    let proof = hasher.generate_proof(&args.items, args.index, depth(hasher, &args.depth))?;
    emit(json, &proof, || {
        println!("Leaf #{}: {}", proof.index, proof.leaf.to_string().cyan());
        for step in &proof.steps {
            println!("  {:?} {}", step.side, step.hash.to_string().dimmed());
        }
        println!("Root: {}", proof.root.to_string().cyan().bold());
    })
}

fn cmd_verify(hasher: &DeepHasher, args: VerifyArgs, json: bool) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(&args.proof)
        .with_context(|| format!("reading proof {}", args.proof.display()))?;
    let proof: MerkleProof = serde_json::from_str(&text).context("parsing proof JSON")?;
    let leaf = args.leaf.as_deref().map(parse_digest).transpose()?.unwrap_or(proof.leaf);
    let root = parse_digest(&args.root)?;

    let valid = hasher.verify_proof(&leaf, &proof, &root, args.leaf_count);
    emit(json, &json!({ "valid": valid }), || {
        if valid {
            println!("{} Proof verified against {}", "✓".green().bold(), root.short_hex().yellow());
        } else {
            println!("{} Proof rejected", "✗".red().bold());
        }
    })?;
    if !valid {
        bail!("merkle proof does not match root {}", root);
    }
    Ok(())
}

fn cmd_chain(hasher: &DeepHasher, args: ChainArgs, json: bool) -> anyhow::Result<()> {
    if let Some(path) = &args.verify {
        return cmd_chain_verify(hasher, path, json);
    }

    let previous = args.previous.as_deref().map(parse_digest).transpose()?;
    let chain = hasher.append_chain(&args.items, previous);
    emit(json, &chain, || {
        println!("Genesis: {}", chain.genesis.to_string().dimmed());
        for (i, link) in chain.links.iter().enumerate() {
            println!(
                "  {} {} {}",
                format!("#{i}").yellow(),
                link.chain_digest.short_hex(),
                String::from_utf8_lossy(&link.item)
            );
        }
        println!("Final:   {} ({} links)", chain.final_digest.to_string().cyan().bold(), chain.length);
    })
}

fn cmd_chain_verify(hasher: &DeepHasher, path: &std::path::Path, json: bool) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading chain {}", path.display()))?;
    let chain: HashChain = serde_json::from_str(&text).context("parsing chain JSON")?;

    let result = ChainVerifier::verify(hasher, &chain);
    let value = json!({
        "valid": result.is_ok(),
        "length": chain.length,
        "final_hash": chain.final_digest,
        "error": result.as_ref().err().map(ToString::to_string),
    });
    emit(json, &value, || match &result {
        Ok(()) => println!(
            "{} Chain of {} link(s) verified, final {}",
            "✓".green().bold(),
            chain.length,
            chain.final_digest.short_hex().yellow()
        ),
        Err(e) => println!("{} Chain rejected: {}", "✗".red().bold(), e),
    })?;
    result.with_context(|| format!("chain {} failed verification", path.display()))
}

fn cmd_composite(hasher: &DeepHasher, args: CompositeArgs, json: bool) -> anyhow::Result<()> {
    let hashes = args
        .hashes
        .iter()
        .map(|s| parse_digest(s))
        .collect::<anyhow::Result<Vec<_>>>()?;
    let d = depth(hasher, &args.depth);
    print_digest(hasher, hasher.composite_hash(&hashes, d), d, json)
}

fn cmd_timed(hasher: &DeepHasher, args: TimedArgs, json: bool) -> anyhow::Result<()> {
    let d = depth(hasher, &args.depth);
    let timed = match args.timestamp {
        Some(ts) => hasher.timed_hash_at(args.input.as_bytes(), d, ts),
        None => hasher.timed_hash(args.input.as_bytes(), d),
    };
    emit(json, &timed, || {
        println!("{}", timed.hash.to_string().cyan());
        println!("  Timestamp: {}", timed.timestamp);
        println!("  Depth: {}  Version: {}", timed.depth, timed.version);
    })
}

fn cmd_dir(hasher: &DeepHasher, args: PathArgs, json: bool) -> anyhow::Result<()> {
    let hashed = shinf_fs::hash_directory(hasher, &args.path, depth(hasher, &args.depth))?;
    emit(json, &hashed, || {
        println!("Root: {}", hashed.root.to_string().cyan().bold());
        for entry in &hashed.entries {
            let name = match entry.kind {
                shinf_fs::EntryKind::Directory => format!("{}/", entry.name).blue().to_string(),
                shinf_fs::EntryKind::File => entry.name.clone(),
            };
            println!("  {}  {}", entry.digest.short_hex().dimmed(), name);
        }
        println!("{} item(s)", hashed.item_count);
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn run(args: &[&str]) -> anyhow::Result<()> {
        run_command(Cli::try_parse_from(args).unwrap())
    }

    fn write_json<T: Serialize>(dir: &std::path::Path, name: &str, value: &T) -> String {
        let path = dir.join(name);
        std::fs::write(&path, serde_json::to_string(value).unwrap()).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn verify_accepts_valid_proof() {
        let dir = tempfile::tempdir().unwrap();
        let tree = DeepHasher::default().build_tree(&["a", "b", "c"], 1);
        let path = write_json(dir.path(), "proof.json", &tree.proof(2).unwrap());
        let root = tree.root().to_hex();
        assert!(run(&["shinf", "verify", &path, "--root", &root, "--leaf-count", "3"]).is_ok());
    }

    #[test]
    fn verify_rejects_foreign_root() {
        let dir = tempfile::tempdir().unwrap();
        let h = DeepHasher::default();
        let proof = h.generate_proof(&["a", "b", "c"], 0, 1).unwrap();
        let path = write_json(dir.path(), "proof.json", &proof);
        let other = h.build_tree(&["x", "y"], 1).root().to_hex();
        assert!(run(&["shinf", "verify", &path, "--root", &other, "--leaf-count", "3"]).is_err());
    }

    #[test]
    fn verify_ignores_root_and_count_carried_by_proof() {
        let dir = tempfile::tempdir().unwrap();
        let h = DeepHasher::default();
        let tree = h.build_tree(&["a", "b", "c"], 1);
        let mut proof = tree.proof(2).unwrap();
        let root = tree.root().to_hex();

        let path = write_json(dir.path(), "proof.json", &proof);
        assert!(run(&["shinf", "verify", &path, "--root", &root, "--leaf-count", "4"]).is_err());

        proof.root = h.build_tree(&["x"], 1).root();
        let path = write_json(dir.path(), "proof.json", &proof);
        assert!(run(&["shinf", "verify", &path, "--root", &root, "--leaf-count", "3"]).is_ok());
    }

    #[test]
    fn chain_verify_accepts_emitted_chain() {
        let dir = tempfile::tempdir().unwrap();
        let chain = DeepHasher::default().append_chain(&["e1", "e2", "e3"], None);
        let path = write_json(dir.path(), "chain.json", &chain);
        assert!(run(&["shinf", "chain", "--verify", &path]).is_ok());
    }

    #[test]
    fn chain_verify_rejects_tampered_chain() {
        let dir = tempfile::tempdir().unwrap();
        let mut chain = DeepHasher::default().append_chain(&["e1", "e2", "e3"], None);
        chain.links[1].item = b"forged".to_vec();
        let path = write_json(dir.path(), "chain.json", &chain);
        let err = run(&["shinf", "chain", "--verify", &path]).unwrap_err();
        assert!(format!("{err:#}").contains("index 1"), "{err:#}");
    }

    #[test]
    fn chain_verify_rejects_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chain.json");
        std::fs::write(&path, "{\"links\": 3}").unwrap();
        let path = path.to_string_lossy().into_owned();
        assert!(run(&["shinf", "chain", "--verify", &path]).is_err());
    }

    #[test]
    fn proof_index_out_of_range_fails() {
        assert!(run(&["shinf", "proof", "-i", "3", "a", "b"]).is_err());
    }

    #[test]
    fn parse_rejects_malformed() {
        assert!(run(&["shinf", "parse", "sha-inf-v1-d1-00"]).is_err());
    }

    #[test]
    fn chain_rejects_bad_previous() {
        assert!(run(&["shinf", "chain", "e1", "--previous", "nothex"]).is_err());
    }

    #[test]
    fn config_file_is_applied() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("shinf.toml");
        std::fs::write(&config, "max_depth = 0\n").unwrap();
        let config = config.to_string_lossy().into_owned();
        assert!(run(&["shinf", "--config", &config, "hash", "x"]).is_err());
    }

    #[test]
    fn dir_command_runs() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("f"), b"data").unwrap();
        let path = dir.path().to_string_lossy().into_owned();
        assert!(run(&["shinf", "--format", "json", "dir", &path]).is_ok());
    }
}
