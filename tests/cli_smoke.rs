use std::path::PathBuf;

use serde_json::json;

fn exe() -> PathBuf {
    std::env::var_os("CARGO_BIN_EXE_imgraph")
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            let mut p = PathBuf::from("target").join("debug");
            p.push(if cfg!(windows) {
                "imgraph.exe"
            } else {
                "imgraph"
            });
            p
        })
}

fn fixture(dir: &str) -> PathBuf {
    let dir = PathBuf::from("target").join(dir);
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("root.png"), "root").unwrap();
    std::fs::write(dir.join("logo.png"), "logo").unwrap();

    let recipe = json!({
        "input": "root.png",
        "ops": [
            { "transform": { "rotate": 90 } },
            { "draw": { "image": "logo.png", "options": { "top": 1 } } }
        ],
        "output": { "format": "image/png" }
    });
    let path = dir.join("recipe.json");
    std::fs::write(&path, serde_json::to_vec(&recipe).unwrap()).unwrap();
    path
}

#[test]
fn cli_plan_prints_instructions() {
    let recipe = fixture("cli_smoke_plan");
    let out = std::process::Command::new(exe())
        .arg("plan")
        .arg(&recipe)
        .output()
        .unwrap();
    assert!(out.status.success());

    let plan: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(
        plan["transforms"],
        json!([
            { "imageIndex": 0, "rotate": 90 },
            { "drawImageIndex": 1, "targetImageIndex": 0, "top": 1 },
        ])
    );
    assert_eq!(plan["draw_images"].as_array().unwrap().len(), 1);
}

#[test]
fn cli_encode_writes_body() {
    let recipe = fixture("cli_smoke_encode");
    let body_path = recipe.with_file_name("body.bin");
    let _ = std::fs::remove_file(&body_path);

    let out = std::process::Command::new(exe())
        .arg("encode")
        .arg(&recipe)
        .arg("--out")
        .arg(&body_path)
        .output()
        .unwrap();
    assert!(out.status.success());

    let content_type = String::from_utf8(out.stdout).unwrap();
    assert!(content_type.starts_with("multipart/form-data; boundary="));
    let body = std::fs::read_to_string(&body_path).unwrap();
    assert!(body.contains("name=\"draw_image\"; filename=\"draw_image\"\r\n\r\nlogo\r\n"));
    assert!(body.trim_end().ends_with("--"));
}
