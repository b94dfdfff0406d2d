//! Loading assets for the files a file set accepts.

use futures::StreamExt;
use themesync_asset::{AssetError, AssetLoader};
use themesync_filter::FileSetBuilder;

fn theme() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    std::fs::create_dir_all(root.join("assets")).unwrap();
    std::fs::create_dir_all(root.join("layout")).unwrap();
    std::fs::write(root.join("assets/app.js"), b"let a = 1;").unwrap();
    std::fs::write(root.join("assets/app.js.swp"), b"\0swap").unwrap();
    std::fs::write(root.join("assets/font.woff"), b"wOFF\0\x01\0\0").unwrap();
    std::fs::write(root.join("layout/theme.liquid"), b"{{ content_for_layout }}").unwrap();
    dir
}

#[tokio::test]
async fn loads_only_accepted_files() {
    let dir = theme();
    let set = FileSetBuilder::new()
        .in_dir(dir.path())
        .with_default_excludes()
        .build()
        .await
        .unwrap();
    let loader = AssetLoader::local(dir.path());

    let assets: Vec<_> = loader
        .load_all(set.files())
        .collect::<Vec<_>>()
        .await
        .into_iter()
        .collect::<Result<_, AssetError>>()
        .unwrap();

    let keys: Vec<&str> = assets.iter().map(|a| a.key.as_str()).collect();
    assert_eq!(keys, vec!["assets/app.js", "assets/font.woff", "layout/theme.liquid"]);
    assert_eq!(assets[0].value, "let a = 1;");
    assert!(assets[1].is_binary());
    assert!(assets.iter().all(|a| a.is_valid()));
}

#[tokio::test]
async fn json_payload_uses_the_expected_field_names() {
    let dir = theme();
    let asset = AssetLoader::local(dir.path())
        .load("assets/font.woff")
        .await
        .unwrap();

    let json: serde_json::Value = serde_json::to_value(&asset).unwrap();
    assert_eq!(json["key"], "assets/font.woff");
    assert_eq!(json["attachment"], "d09GRgABAAA=");
    assert!(json.get("value").is_none());
}
