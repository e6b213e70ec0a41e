use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context};
use coffer_registry::{Registrations, Registry};
use coffer_store::{Engine, StoreConfig};
use coffer_types::{Collection, Subset};
use colored::Colorize;
use tracing::debug;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let engine = build_engine(cli.config.as_deref())?;
    match cli.command {
        Command::Ls(args) => cmd_ls(&engine, args),
        Command::Pack(args) => cmd_pack(&engine, args),
        Command::Unpack(args) => cmd_unpack(&engine, args),
        Command::Copy(args) => cmd_copy(&engine, args),
    }
}

/// The composition root: every member type the tool understands is
/// registered here, once, before any store is touched.
fn build_engine(config: Option<&Path>) -> anyhow::Result<Engine> {
    let config = match config {
        Some(path) => load_config(path)?,
        None => StoreConfig::default(),
    };
    let registry = Registry::from_registrations(&Registrations::standard())?;
    debug!(types = registry.len(), config = ?config, "engine ready");
    Ok(Engine::with_config(Arc::new(registry), config))
}

fn load_config(path: &Path) -> anyhow::Result<StoreConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file '{}'", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("failed to parse config file '{}'", path.display()))
}

/// Load a collection from either a directory or a blob file.
fn load_collection(engine: &Engine, path: &Path, subset: &Subset) -> anyhow::Result<Collection> {
    let mut collection = Collection::default();
    if path.is_dir() {
        engine
            .load_from_dir(path, &mut collection, subset)
            .with_context(|| format!("failed to load directory '{}'", path.display()))?;
    } else {
        let data =
            fs::read(path).with_context(|| format!("failed to read '{}'", path.display()))?;
        engine
            .load_from_bytes(&data, &mut collection, subset)
            .with_context(|| format!("failed to decode '{}'", path.display()))?;
    }
    Ok(collection)
}

fn cmd_ls(engine: &Engine, args: LsArgs) -> anyhow::Result<()> {
    let collection = load_collection(engine, &args.path, &Subset::of(args.only))?;
    println!(
        "{} {}",
        collection.name().bold(),
        format!(
            "({} members, timestamp {})",
            collection.len(),
            collection.timestamp_ms()
        )
        .dimmed()
    );

    for member in collection.members() {
        let tag = member.type_tag().to_string();
        let tag = match engine
            .registry()
            .lookup(member.type_tag().as_str())
            .and_then(|f| f.display_color())
        {
            Some(c) => tag.truecolor(c.r, c.g, c.b),
            None => tag.normal(),
        };
        let size = match engine.serialize_member(member) {
            Ok(s) => format!("{} bytes .{}", s.data.len(), s.extension),
            Err(e) => format!("not serializable: {e}"),
        };
        println!(
            "  {:<24} {}  {}  {}",
            member.name(),
            tag,
            member.timestamp_ms().to_string().dimmed(),
            size.dimmed()
        );
    }
    Ok(())
}

fn cmd_pack(engine: &Engine, args: PackArgs) -> anyhow::Result<()> {
    if !args.dir.is_dir() {
        bail!("'{}' is not a collection directory", args.dir.display());
    }
    let collection = load_collection(engine, &args.dir, &Subset::all())?;
    let data = engine.save_to_bytes(&collection)?;
    fs::write(&args.file, &data)
        .with_context(|| format!("failed to write '{}'", args.file.display()))?;
    println!(
        "{} Packed {} members into {} ({} bytes)",
        "✓".green().bold(),
        collection.len(),
        args.file.display().to_string().bold(),
        data.len()
    );
    Ok(())
}

fn cmd_unpack(engine: &Engine, args: UnpackArgs) -> anyhow::Result<()> {
    let collection = load_collection(engine, &args.file, &Subset::all())?;
    let summary = engine
        .save_to_dir(&collection, &args.dir, args.append)
        .with_context(|| format!("failed to save into '{}'", args.dir.display()))?;
    println!(
        "{} Unpacked {} members into {}",
        "✓".green().bold(),
        summary.written,
        args.dir.display().to_string().bold()
    );
    if summary.retained > 0 {
        println!("  {} existing members kept", summary.retained);
    }
    Ok(())
}

fn cmd_copy(engine: &Engine, args: CopyArgs) -> anyhow::Result<()> {
    let source = load_collection(engine, &args.src, &Subset::all())?;
    let subset = Subset::of(args.only);

    if args.blob {
        let mut target = if args.dst.exists() {
            if !args.append {
                bail!("'{}' already exists (use --append)", args.dst.display());
            }
            load_collection(engine, &args.dst, &Subset::all())?
        } else {
            Collection::default()
        };
        target.set_name(source.name());
        target.set_timestamp_ms(source.timestamp_ms());

        let mut copied = 0;
        for member in source.members().iter().filter(|m| subset.admits(m.name())) {
            target.replace_member(engine.clone_member(member)?);
            copied += 1;
        }
        let data = engine.save_to_bytes(&target)?;
        fs::write(&args.dst, &data)
            .with_context(|| format!("failed to write '{}'", args.dst.display()))?;
        print_copied(copied, &args.dst);
        return Ok(());
    }

    let mut target = Collection::new(source.name());
    target.set_timestamp_ms(source.timestamp_ms());
    let copied = engine.clone_append(&source, &mut target, &subset)?;
    engine
        .save_to_dir(&target, &args.dst, args.append)
        .with_context(|| format!("failed to save into '{}'", args.dst.display()))?;
    print_copied(copied, &args.dst);
    Ok(())
}

fn print_copied(count: usize, dst: &Path) {
    println!(
        "{} Copied {} members to {}",
        "✓".green().bold(),
        count,
        dst.display().to_string().bold()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use coffer_registry::members;
    use coffer_store::IndexReplace;

    fn engine() -> Engine {
        build_engine(None).unwrap()
    }

    fn write_sample_dir(engine: &Engine, dir: &Path) {
        let mut c = Collection::new("sample");
        c.add_member(members::int("a", 1));
        c.add_member(members::string("b", "two"));
        c.add_member(members::double("c", 3.0));
        engine.save_to_dir(&c, dir, false).unwrap();
    }

    #[test]
    fn config_from_toml() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("coffer.toml");
        fs::write(&path, "index_replace = \"copy_over\"\npretty_index = false\n").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.index_replace, IndexReplace::CopyOver);
        assert!(!config.pretty_index);
        assert_eq!(config.index_file, "index.json");
    }

    #[test]
    fn bad_config_names_the_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("broken.toml");
        fs::write(&path, "index_replace = 3").unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("broken.toml"));
    }

    #[test]
    fn pack_then_unpack() {
        let tmp = tempfile::tempdir().unwrap();
        let e = engine();
        let dir = tmp.path().join("src");
        write_sample_dir(&e, &dir);

        let file = tmp.path().join("sample.bin");
        cmd_pack(&e, PackArgs { dir: dir.clone(), file: file.clone() }).unwrap();
        let out = tmp.path().join("out");
        cmd_unpack(&e, UnpackArgs { file, dir: out.clone(), append: false }).unwrap();

        let loaded = load_collection(&e, &out, &Subset::all()).unwrap();
        assert_eq!(loaded.name(), "sample");
        assert_eq!(loaded.names().collect::<Vec<_>>(), ["a", "b", "c"]);
    }

    #[test]
    fn copy_subset_to_directory_and_blob() {
        let tmp = tempfile::tempdir().unwrap();
        let e = engine();
        let src = tmp.path().join("src");
        write_sample_dir(&e, &src);

        let dst = tmp.path().join("dst");
        cmd_copy(
            &e,
            CopyArgs {
                src: src.clone(),
                dst: dst.clone(),
                only: vec!["a".into()],
                append: false,
                blob: false,
            },
        )
        .unwrap();
        let loaded = load_collection(&e, &dst, &Subset::all()).unwrap();
        assert_eq!(loaded.names().collect::<Vec<_>>(), ["a"]);

        let blob = tmp.path().join("dst.bin");
        for only in [vec!["b".to_string()], vec!["a".to_string(), "b".to_string()]] {
            cmd_copy(
                &e,
                CopyArgs {
                    src: src.clone(),
                    dst: blob.clone(),
                    only,
                    append: true,
                    blob: true,
                },
            )
            .unwrap();
        }
        let loaded = load_collection(&e, &blob, &Subset::all()).unwrap();
        assert_eq!(loaded.names().collect::<Vec<_>>(), ["b", "a"]);
    }

    #[test]
    fn copy_to_existing_blob_requires_append() {
        let tmp = tempfile::tempdir().unwrap();
        let e = engine();
        let src = tmp.path().join("src");
        write_sample_dir(&e, &src);
        let blob = tmp.path().join("taken.bin");
        fs::write(&blob, b"keep").unwrap();

        let result = cmd_copy(
            &e,
            CopyArgs {
                src,
                dst: blob.clone(),
                only: Vec::new(),
                append: false,
                blob: true,
            },
        );
        assert!(result.is_err());
        assert_eq!(fs::read(&blob).unwrap(), b"keep");
    }
}
