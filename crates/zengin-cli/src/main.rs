use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use zengin::diag::{Collect, Warning};
use zengin::script::{Opcode, Script, SymbolKind};
use zengin::texture::Texture;
use zengin::world::{Vob, World};
use zengin::GameVersion;

#[derive(Parser)]
#[command(name = "zengin", about = "Inspector for ZenGin asset files")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Detect the file type and print a summary.
    Info {
        file: PathBuf,
        /// Output the summary as JSON.
        #[arg(long)]
        json: bool,
    },
    /// List the symbol table of a compiled script.
    Symbols {
        file: PathBuf,
        /// Only symbols whose name contains this substring.
        #[arg(long)]
        filter: Option<String>,
    },
    /// Disassemble one function, prototype or instance of a compiled
    /// script.
    Disasm {
        file: PathBuf,
        /// Symbol name or decimal start address.
        target: String,
    },
    /// Print the VOB forest of a world.
    Vobs {
        file: PathBuf,
        /// Game release the world was compiled for.
        #[arg(long, default_value = "gothic1")]
        game: Game,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum Game {
    Gothic1,
    Gothic2,
}

impl From<Game> for GameVersion {
    fn from(game: Game) -> Self {
        match game {
            Game::Gothic1 => GameVersion::Gothic1,
            Game::Gothic2 => GameVersion::Gothic2,
        }
    }
}

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum Summary {
    Texture {
        format: String,
        width: u32,
        height: u32,
        mipmaps: u32,
        average_color: [u8; 4],
    },
    Script {
        version: u8,
        symbols: usize,
        bytecode_bytes: usize,
    },
    World {
        vertices: usize,
        materials: usize,
        polygons: usize,
        bsp_mode: String,
        root_vobs: usize,
        warnings: usize,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Command::Info { file, json } => info(&file, json),
        Command::Symbols { file, filter } => symbols(&file, filter.as_deref()),
        Command::Disasm { file, target } => disasm(&file, &target),
        Command::Vobs { file, game } => vobs(&file, game.into()),
    }
}

fn load(file: &PathBuf) -> Result<Vec<u8>> {
    fs::read(file).with_context(|| format!("failed to read {}", file.display()))
}

fn info(file: &PathBuf, json: bool) -> Result<()> {
    let data = load(file)?;

    let summary = if data.starts_with(b"ZTEX") {
        let tex = Texture::parse(&data)?;
        Summary::Texture {
            format: format!("{:?}", tex.format()),
            width: tex.width(),
            height: tex.height(),
            mipmaps: tex.mipmap_count(),
            average_color: tex.average_color(),
        }
    } else if data.starts_with(b"ZenGin Archive") {
        let mut diag = Collect::default();
        let world = World::parse(&data, GameVersion::Gothic1, &mut diag)?;
        Summary::World {
            vertices: world.mesh.vertices.len(),
            materials: world.mesh.materials.len(),
            polygons: world.mesh.polygons.len(),
            bsp_mode: format!("{:?}", world.bsp_tree.mode),
            root_vobs: world.vobs.len(),
            warnings: diag.warnings.len(),
        }
    } else {
        let script = Script::parse(&data)
            .context("file is neither a texture, an archive nor a compiled script")?;
        Summary::Script {
            version: script.version(),
            symbols: script.symbols().len(),
            bytecode_bytes: script.bytecode().len(),
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    match summary {
        Summary::Texture {
            format,
            width,
            height,
            mipmaps,
            average_color,
        } => {
            println!("texture {format} {width}x{height}, {mipmaps} mipmap level(s)");
            println!("average color (bgra): {average_color:?}");
        }
        Summary::Script {
            version,
            symbols,
            bytecode_bytes,
        } => {
            println!("compiled script v{version}: {symbols} symbols, {bytecode_bytes} bytes of bytecode");
        }
        Summary::World {
            vertices,
            materials,
            polygons,
            bsp_mode,
            root_vobs,
            warnings,
        } => {
            println!("world: {vertices} vertices, {materials} materials, {polygons} polygons");
            println!("bsp: {bsp_mode}; {root_vobs} root vob(s); {warnings} warning(s)");
        }
    }
    Ok(())
}

fn symbols(file: &PathBuf, filter: Option<&str>) -> Result<()> {
    let data = load(file)?;
    let script = Script::parse(&data)?;

    for (i, sym) in script.symbols().iter().enumerate() {
        if let Some(filter) = filter {
            if !sym.name.to_ascii_uppercase().contains(&filter.to_ascii_uppercase()) {
                continue;
            }
        }
        let address = match sym.kind {
            SymbolKind::Function | SymbolKind::Prototype | SymbolKind::Instance => {
                format!(" @ {}", sym.address)
            }
            _ => String::new(),
        };
        println!("{i:>5} {:<10} {}{address}", format!("{:?}", sym.kind), sym.name);
    }
    Ok(())
}

fn disasm(file: &PathBuf, target: &str) -> Result<()> {
    let data = load(file)?;
    let script = Script::parse(&data)?;

    let start = match target.parse::<u32>() {
        Ok(address) => address,
        Err(_) => {
            let sym = script
                .symbol_by_name(target)
                .with_context(|| format!("no symbol named {target:?}"))?;
            match sym.kind {
                SymbolKind::Function | SymbolKind::Prototype | SymbolKind::Instance => sym.address,
                other => bail!("symbol {target:?} is a {other:?}, not callable"),
            }
        }
    };

    let mut pc = start;
    loop {
        let inst = script.instruction_at(pc)?;
        let view = inst.view();
        let operand = match inst.op {
            Opcode::Call | Opcode::Jump | Opcode::JumpIfZero => format!(" {}", view.address),
            Opcode::CallExternal
            | Opcode::PushVar
            | Opcode::PushInstance
            | Opcode::SetInstance => {
                let name = script
                    .symbol_by_index(view.symbol as usize)
                    .map(|s| s.name.as_str())
                    .unwrap_or("?");
                format!(" {} ({name})", view.symbol)
            }
            Opcode::PushInt => format!(" {}", view.immediate),
            Opcode::PushArrayVar => format!(" {}[{}]", view.symbol, view.index),
            _ => String::new(),
        };
        println!("{pc:>8}: {:?}{operand}", inst.op);

        pc += u32::from(inst.size);
        if inst.op == Opcode::Return || pc as usize >= script.bytecode().len() {
            return Ok(());
        }
    }
}

fn vobs(file: &PathBuf, version: GameVersion) -> Result<()> {
    let data = load(file)?;
    let mut diag = Collect::default();
    let world = World::parse(&data, version, &mut diag)?;

    fn print_vob(vob: &Vob, depth: usize) {
        let name = if vob.vob_name.is_empty() {
            "<unnamed>"
        } else {
            &vob.vob_name
        };
        let visual = if vob.visual_name.is_empty() {
            String::new()
        } else {
            format!(" [{}]", vob.visual_name)
        };
        println!(
            "{:indent$}{name}{visual} at ({:.1}, {:.1}, {:.1})",
            "",
            vob.position.x,
            vob.position.y,
            vob.position.z,
            indent = depth * 2
        );
        for child in &vob.children {
            print_vob(child, depth + 1);
        }
    }

    for vob in &world.vobs {
        print_vob(vob, 0);
    }

    for warning in &diag.warnings {
        if !matches!(warning, Warning::LeftoverChunkBytes { .. }) {
            eprintln!("warning: {warning}");
        }
    }
    Ok(())
}
