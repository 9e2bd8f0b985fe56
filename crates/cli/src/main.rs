use anyhow::{bail, Context};
use card_injector_core::{
    image_id_from_url, normalize_name, Bootstrap, Event, LookupIndex, SlotCategory,
};
use card_injector_data::{
    build_card_manifest, init_logging, load_card_manifest, load_document, load_item_manifest,
    load_json, pack_scraped_items, save_settings, write_json, AssetDir, ScrapedItem, Settings,
};
use serde::Serialize;
use std::path::{Path, PathBuf};

const DEFAULT_ASSETS_DIR: &str = "assets";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Help,
    Status,
    Enable,
    Disable,
    Resolve,
    Item,
    Patch,
    BuildCards,
    PackItems,
}

impl Command {
    fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "help" | "-h" | "--help" => Some(Self::Help),
            "status" => Some(Self::Status),
            "enable" | "on" => Some(Self::Enable),
            "disable" | "off" => Some(Self::Disable),
            "resolve" => Some(Self::Resolve),
            "item" => Some(Self::Item),
            "patch" => Some(Self::Patch),
            "build-cards" => Some(Self::BuildCards),
            "pack-items" => Some(Self::PackItems),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
struct CliOptions {
    command: Command,
    assets: PathBuf,
    out: Option<PathBuf>,
    args: Vec<String>,
}

fn parse_cli_options(args: &[String]) -> anyhow::Result<CliOptions> {
    let mut command = None;
    let mut assets = PathBuf::from(DEFAULT_ASSETS_DIR);
    let mut out = None;
    let mut rest = Vec::new();
    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "--assets" | "-a" => {
                let Some(value) = args.get(idx + 1) else {
                    bail!("--assets needs a directory");
                };
                assets = PathBuf::from(value);
                idx += 1;
            }
            "--out" | "-o" => {
                let Some(value) = args.get(idx + 1) else {
                    bail!("--out needs a path");
                };
                out = Some(PathBuf::from(value));
                idx += 1;
            }
            other if command.is_none() => {
                let Some(parsed) = Command::from_keyword(other) else {
                    bail!("unknown command: {other}");
                };
                command = Some(parsed);
            }
            other => rest.push(other.to_string()),
        }
        idx += 1;
    }
    Ok(CliOptions {
        command: command.unwrap_or(Command::Help),
        assets,
        out,
        args: rest,
    })
}

fn main() {
    init_logging();
    let args: Vec<String> = std::env::args().skip(1).collect();
    if let Err(err) = run(&args) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run(args: &[String]) -> anyhow::Result<()> {
    let options = parse_cli_options(args)?;
    let assets = AssetDir::new(&options.assets);
    match options.command {
        Command::Help => {
            print_help();
            Ok(())
        }
        Command::Status => run_status(&assets),
        Command::Enable => set_enabled(&assets, true),
        Command::Disable => set_enabled(&assets, false),
        Command::Resolve => run_resolve(&assets, &options.args),
        Command::Item => run_item(&assets, &options.args),
        Command::Patch => run_patch(&assets, &options),
        Command::BuildCards => run_build_cards(&assets, &options),
        Command::PackItems => run_pack_items(&assets, &options),
    }
}

fn print_help() {
    println!("Usage: card-injector [--assets DIR] <command> [args]");
    println!();
    println!("Commands:");
    println!("  status                        show toggle state and manifest sizes");
    println!("  enable|disable                flip the persisted toggle");
    println!("  resolve <label>...            match card labels against cards.json");
    println!("  item <image_url|id>...        look up item cards by embedded image id");
    println!("  patch <page.json> [--out F]   patch a document snapshot, print events");
    println!("  build-cards <images> [--out F]  generate cards.json from an images folder");
    println!("  pack-items <scraped> [--out F]  generate itemcards.json from scraped items");
    println!();
    println!("Set CARD_INJECTOR_LOG=debug for per-node diagnostics.");
}

fn load_index(assets: &AssetDir) -> anyhow::Result<LookupIndex> {
    let cards = load_card_manifest(&assets.cards_path())?;
    let items = load_item_manifest(&assets.items_path())?;
    Ok(LookupIndex::build(&cards, &items))
}

fn run_status(assets: &AssetDir) -> anyhow::Result<()> {
    let settings = assets.settings()?;
    println!(
        "status: {}",
        if settings.is_enabled() {
            "replacing card images"
        } else {
            "disabled"
        }
    );
    let cards = load_card_manifest(&assets.cards_path())?;
    println!(
        "ability cards: {} characters, {} cards",
        cards.characters.len(),
        cards.card_count()
    );
    let items = load_item_manifest(&assets.items_path())?;
    let index = LookupIndex::build(&cards, &items);
    println!(
        "item cards: {} records, {} with image ids, {} icons",
        items.items.len(),
        index.item_count(),
        items.equip_slot_icons.len()
    );
    Ok(())
}

fn set_enabled(assets: &AssetDir, enabled: bool) -> anyhow::Result<()> {
    let settings = Settings {
        enabled: Some(enabled),
    };
    save_settings(assets.root(), &settings)?;
    println!("{}", if enabled { "enabled" } else { "disabled" });
    Ok(())
}

fn run_resolve(assets: &AssetDir, labels: &[String]) -> anyhow::Result<()> {
    if labels.is_empty() {
        bail!("resolve needs at least one label");
    }
    let index = load_index(assets)?;
    let config = assets.config()?;
    for label in labels {
        let key = normalize_name(label.trim());
        let exact = index.exact(&key).is_some();
        match index.match_key(&key, config.max_fuzzy_distance) {
            Some(found) => println!(
                "{label} -> {}/{} ({}) {}",
                found.character,
                found.card,
                if exact { "exact" } else { "fuzzy" },
                config.asset_url(found.character, found.card)
            ),
            None => println!("{label} -> no match (key '{key}')"),
        }
    }
    Ok(())
}

fn run_item(assets: &AssetDir, refs: &[String]) -> anyhow::Result<()> {
    if refs.is_empty() {
        bail!("item needs an image url or id");
    }
    let index = load_index(assets)?;
    for raw in refs {
        let id = if raw.bytes().all(|b| b.is_ascii_digit()) {
            Some(raw.as_str())
        } else {
            image_id_from_url(raw)
        };
        let Some(id) = id else {
            println!("{raw} -> no image id");
            continue;
        };
        match index.item(id) {
            Some(item) => {
                let slot = item
                    .equip_slot
                    .as_deref()
                    .and_then(SlotCategory::from_keyword)
                    .map(|slot| slot.keyword().to_string())
                    .or_else(|| item.equip_slot_icon.map(|i| format!("icon #{i}")))
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "{id} -> {} (cost {}, slot {slot})",
                    item.name,
                    item.cost.as_deref().unwrap_or("-")
                );
            }
            None => println!("{id} -> unknown item"),
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct PatchSummary<'a> {
    patched: usize,
    events: &'a [Event],
}

fn run_patch(assets: &AssetDir, options: &CliOptions) -> anyhow::Result<()> {
    let Some(page) = options.args.first() else {
        bail!("patch needs a document snapshot path");
    };
    let config = assets.config()?;
    let Some(mut injector) = Bootstrap::start(assets, assets, config)? else {
        println!("disabled; document left unmodified");
        return Ok(());
    };
    let mut doc = load_document(Path::new(page))?;
    let patched = injector.attach(&mut doc);
    let events = injector.drain_events();
    for event in &events {
        println!("{}", describe_event(event));
    }
    let summary = PatchSummary {
        patched,
        events: &events,
    };
    let summary = serde_json::to_string(&summary).context("serialize summary")?;
    tracing::debug!(%summary, "patch finished");
    let snapshot = doc.snapshot(doc.root());
    match options.out.as_ref() {
        Some(out) => {
            write_json(out, &snapshot)?;
            println!("wrote {} ({patched} nodes patched)", out.display());
        }
        None => println!(
            "{}",
            serde_json::to_string_pretty(&snapshot).context("serialize snapshot")?
        ),
    }
    Ok(())
}

fn describe_event(event: &Event) -> String {
    match event {
        Event::AbilityCardPatched {
            node,
            character,
            card,
            url,
        } => format!("node {}: {character}/{card} -> {url}", node.index()),
        Event::ItemOverlayInjected {
            node,
            image_id,
            name,
        } => format!("node {}: item {image_id} labelled '{name}'", node.index()),
        Event::ItemOverlayReoriented {
            node,
            image_id,
            rotated,
        } => format!(
            "node {}: item {image_id} {}",
            node.index(),
            if *rotated { "rotated" } else { "upright" }
        ),
        Event::ItemOverlayCleared { node } => format!("node {}: overlay cleared", node.index()),
    }
}

fn run_build_cards(assets: &AssetDir, options: &CliOptions) -> anyhow::Result<()> {
    let Some(images) = options.args.first() else {
        bail!("build-cards needs an images directory");
    };
    let report = build_card_manifest(Path::new(images))?;
    for warning in &report.warnings {
        eprintln!("warning: {warning}");
    }
    let out = options.out.clone().unwrap_or_else(|| assets.cards_path());
    write_json(&out, &report.manifest)?;
    println!(
        "generated {} with {} character(s) and {} card(s)",
        out.display(),
        report.manifest.characters.len(),
        report.manifest.card_count()
    );
    for entry in &report.manifest.characters {
        println!("  {}: {} cards", entry.character, entry.cards.len());
    }
    Ok(())
}

fn run_pack_items(assets: &AssetDir, options: &CliOptions) -> anyhow::Result<()> {
    let Some(scraped_path) = options.args.first() else {
        bail!("pack-items needs a scraped items file");
    };
    let scraped: Vec<ScrapedItem> = load_json(scraped_path)?;
    let manifest = pack_scraped_items(scraped);
    let out = options.out.clone().unwrap_or_else(|| assets.items_path());
    write_json(&out, &manifest)?;
    println!(
        "saved {} items with {} unique equip slot icons to {}",
        manifest.items.len(),
        manifest.equip_slot_icons.len(),
        out.display()
    );
    Ok(())
}
