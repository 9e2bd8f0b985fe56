use card_injector_core::{Bootstrap, NodeSnapshot, WatchState};
use card_injector_data::{
    build_card_manifest, load_document, save_settings, write_json, AssetDir, Settings,
    CARDS_FILE, ITEMS_FILE,
};
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

static NEXT_DIR: AtomicUsize = AtomicUsize::new(0);

fn unique_temp_dir(tag: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!(
        "card_injector_{tag}_{}_{}_{}",
        std::process::id(),
        nanos,
        NEXT_DIR.fetch_add(1, Ordering::Relaxed)
    ));
    fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn write_assets(dir: &PathBuf) {
    fs::write(dir.join(CARDS_FILE), r#"{"Brute": ["eye-for-an-eye", "trample"]}"#)
        .expect("write cards");
    fs::write(
        dir.join(ITEMS_FILE),
        r#"{"equip_slot_icons": [], "items": [
            {"name": "Boots of Striding", "cost": "20", "equip_slot": "legs",
             "image_url": "https://h/public/images/byid/101.image.webp"}
        ]}"#,
    )
    .expect("write items");
}

#[test]
fn bootstraps_from_asset_dir_and_patches_a_snapshot() {
    let dir = unique_temp_dir("assets");
    write_assets(&dir);
    let page = NodeSnapshot::new("body")
        .child(
            NodeSnapshot::new("svg")
                .child(NodeSnapshot::new("image").attr("href", "https://g/public/images/byid/9"))
                .child(NodeSnapshot::new("text").text("Trample")),
        )
        .child(
            NodeSnapshot::new("button").attr("class", "image cell").child(
                NodeSnapshot::new("svg").attr("class", "item").child(
                    NodeSnapshot::new("image")
                        .attr("href", "https://h/public/images/byid/101.image.webp"),
                ),
            ),
        );
    let page_path = dir.join("page.json");
    write_json(&page_path, &page).expect("write page");

    let assets = AssetDir::new(&dir);
    let config = assets.config().expect("config");
    let mut injector = Bootstrap::start(&assets, &assets, config)
        .expect("start")
        .expect("enabled by default");
    let mut doc = load_document(&page_path).expect("load page");
    assert_eq!(injector.attach(&mut doc), 2);
    assert_eq!(injector.state(), WatchState::Observing);

    let patched = doc.snapshot(doc.root());
    let image = &patched.children[0].children[0];
    assert!(image.attrs["href"].ends_with("/Brute/trample.jpeg"));
    let button = &patched.children[1];
    assert_eq!(button.attrs["data-injected-item-id"], "101");
    assert_eq!(button.children.len(), 4);
    let _ = fs::remove_dir_all(dir);
}

#[test]
fn disabled_toggle_skips_everything() {
    let dir = unique_temp_dir("disabled");
    write_assets(&dir);
    save_settings(
        &dir,
        &Settings {
            enabled: Some(false),
        },
    )
    .expect("save settings");
    let assets = AssetDir::new(&dir);
    let started = Bootstrap::start(&assets, &assets, Default::default()).expect("start");
    assert!(started.is_none());
    let _ = fs::remove_dir_all(dir);
}

#[test]
fn missing_manifest_fails_startup() {
    let dir = unique_temp_dir("missing");
    let assets = AssetDir::new(&dir);
    let err = Bootstrap::start(&assets, &assets, Default::default())
        .err()
        .expect("must fail");
    let message = err.to_string();
    assert!(message.contains("card manifest"), "{message}");
    assert!(message.contains("cards.json"), "{message}");
    let _ = fs::remove_dir_all(dir);
}

#[test]
fn card_manifest_from_images_folder() {
    let dir = unique_temp_dir("images");
    let brute = dir.join("Brute");
    let empty = dir.join("Empty");
    fs::create_dir_all(&brute).expect("mkdir");
    fs::create_dir_all(&empty).expect("mkdir");
    for name in ["trample.jpeg", "eye-for-an-eye.JPG", "notes.txt", "balanced-measure.webp"] {
        fs::write(brute.join(name), b"").expect("write image");
    }
    fs::write(dir.join("stray.png"), b"").expect("write stray");

    let report = build_card_manifest(&dir).expect("build");
    assert_eq!(report.manifest.characters.len(), 1);
    assert_eq!(report.manifest.characters[0].character, "Brute");
    assert_eq!(
        report.manifest.characters[0].cards,
        vec!["balanced-measure", "eye-for-an-eye", "trample"]
    );
    assert_eq!(report.warnings, vec!["no images in Empty".to_string()]);
    let _ = fs::remove_dir_all(dir);
}
