//! CLI integration tests for the `composer` commands.
//!
//! Each test lays out a staging directory in a temp dir, runs the binary
//! from there and checks the files it leaves behind.

use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame, Rgba, RgbaImage};
use std::fs::{self, File};
use std::io::{BufWriter, Read};
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;
use zip::ZipArchive;

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
const RED: Rgba<u8> = Rgba([200, 40, 40, 255]);
const ORANGE: Rgba<u8> = Rgba([248, 160, 64, 255]);
const PINK: Rgba<u8> = Rgba([216, 104, 200, 255]);
const CREAM: Rgba<u8> = Rgba([255, 255, 152, 255]);

/// Run composer in `dir` and return (stdout, stderr, exit code).
fn run_composer(dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_composer"))
        .args(args)
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute composer");
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.code().unwrap_or(-1))
}

/// Temp dir with an empty `pokemon-sprites-staging/` inside.
fn staging_dir() -> TempDir {
    let temp = TempDir::new().expect("should create temp dir");
    fs::create_dir_all(temp.path().join("pokemon-sprites-staging")).unwrap();
    temp
}

/// A 6x6 sprite: white background with an off-white halo around a black
/// outlined two-color body.
fn messy_sprite(light: Rgba<u8>, dark: Rgba<u8>) -> RgbaImage {
    let mut image = RgbaImage::from_pixel(6, 6, WHITE);
    for x in 1..5 {
        image.put_pixel(x, 1, Rgba([250, 251, 249, 255]));
    }
    for y in 2..6 {
        for x in 1..5 {
            image.put_pixel(x, y, Rgba([5, 3, 2, 255]));
        }
    }
    image.put_pixel(2, 3, light);
    image.put_pixel(3, 4, dark);
    image
}

fn load(path: &Path) -> RgbaImage {
    image::open(path)
        .expect("output image should exist")
        .to_rgba8()
}

fn write_gif(path: &Path, frames: &[(RgbaImage, u32)]) {
    let file = File::create(path).unwrap();
    let mut encoder = GifEncoder::new(BufWriter::new(file));
    encoder.set_repeat(Repeat::Infinite).unwrap();
    for (image, ms) in frames {
        let delay = Delay::from_numer_denom_ms(*ms, 1);
        let frame = Frame::from_parts(image.clone(), 0, 0, delay);
        encoder.encode_frame(frame).unwrap();
    }
}

// ============================================================================
// fixup
// ============================================================================

#[test]
fn test_fixup_default_sprites_in_place() {
    let temp = staging_dir();
    let staging = temp.path().join("pokemon-sprites-staging");
    for name in ["front.png", "back.png", "shiny.png"] {
        messy_sprite(ORANGE, RED).save(staging.join(name)).unwrap();
    }

    let (_, stderr, code) = run_composer(temp.path(), &["fixup"]);
    assert_eq!(code, 0, "fixup failed: {}", stderr);

    for name in ["front.png", "back.png", "shiny.png"] {
        let fixed = load(&staging.join(name));
        assert_eq!(fixed.dimensions(), (6, 6));
        assert_eq!(
            *fixed.get_pixel(0, 0),
            Rgba([255, 255, 255, 0]),
            "{}",
            name
        );
        assert_eq!(
            *fixed.get_pixel(2, 1),
            Rgba([255, 255, 255, 0]),
            "halo cleared in {}",
            name
        );
        assert_eq!(*fixed.get_pixel(1, 2), BLACK, "outline snapped in {}", name);
        assert_eq!(*fixed.get_pixel(2, 3), ORANGE);
        assert_eq!(*fixed.get_pixel(3, 4), RED);
    }
}

#[test]
fn test_fixup_explicit_output_leaves_input() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("sprite.png");
    let output = temp.path().join("out/fixed.png");
    let sprite = messy_sprite(ORANGE, RED);
    sprite.save(&input).unwrap();

    let (_, stderr, code) = run_composer(
        temp.path(),
        &[
            "fixup",
            input.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
        ],
    );
    assert_eq!(code, 0, "fixup failed: {}", stderr);

    assert_eq!(load(&input), sprite);
    assert_eq!(load(&output).get_pixel(0, 0)[3], 0);
}

#[test]
fn test_fixup_output_with_many_inputs_is_rejected() {
    let temp = staging_dir();
    let (_, stderr, code) = run_composer(temp.path(), &["fixup", "-o", "x.png"]);
    assert_eq!(code, 2);
    assert!(stderr.contains("exactly one input"), "stderr: {}", stderr);
}

#[test]
fn test_fixup_missing_file_fails() {
    let temp = staging_dir();
    let (_, stderr, code) = run_composer(temp.path(), &["fixup"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("Error:"), "stderr: {}", stderr);
    assert!(stderr.contains("front.png"), "stderr: {}", stderr);
}

#[test]
fn test_fixup_tolerance_flag() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("sprite.png");
    let mut sprite = RgbaImage::from_pixel(3, 3, BLACK);
    sprite.put_pixel(1, 1, Rgba([12, 12, 12, 255]));
    sprite.save(&input).unwrap();

    let (_, stderr, code) = run_composer(
        temp.path(),
        &["fixup", input.to_str().unwrap(), "--tolerance", "16"],
    );
    assert_eq!(code, 0, "fixup failed: {}", stderr);
    assert_eq!(*load(&input).get_pixel(1, 1), BLACK);
}

#[test]
fn test_fixup_reads_config_file() {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join("mons/abra")).unwrap();
    fs::write(
        temp.path().join("composer.toml"),
        "[paths]\nstaging = \"mons/abra\"\nsprites = [\"back.png\"]\n\n[fixup]\ntolerance = 16\n",
    )
    .unwrap();
    let mut sprite = RgbaImage::from_pixel(3, 3, BLACK);
    sprite.put_pixel(1, 1, Rgba([12, 12, 12, 255]));
    sprite.save(temp.path().join("mons/abra/back.png")).unwrap();

    let (_, stderr, code) = run_composer(temp.path(), &["fixup"]);
    assert_eq!(code, 0, "fixup failed: {}", stderr);
    let fixed = load(&temp.path().join("mons/abra/back.png"));
    assert_eq!(*fixed.get_pixel(1, 1), BLACK);
}

#[test]
fn test_invalid_config_fails() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("composer.toml"),
        "[fixup]\ntolerance = 0\n",
    )
    .unwrap();

    let (_, stderr, code) = run_composer(temp.path(), &["fixup"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("fixup.tolerance"), "stderr: {}", stderr);
}

// ============================================================================
// shiny
// ============================================================================

#[test]
fn test_shiny_writes_palette_listing() {
    let temp = staging_dir();
    let staging = temp.path().join("pokemon-sprites-staging");
    let mut shiny = RgbaImage::from_pixel(4, 4, Rgba([255, 255, 255, 0]));
    shiny.put_pixel(1, 1, PINK);
    shiny.put_pixel(2, 2, CREAM);
    shiny.put_pixel(3, 3, BLACK);
    shiny.save(staging.join("shiny.png")).unwrap();

    let (stdout, stderr, code) = run_composer(temp.path(), &["shiny"]);
    assert_eq!(code, 0, "shiny failed: {}", stderr);

    let expected = "\n\tRGB 31, 31, 19\n\tRGB 27, 13, 25\n";
    assert_eq!(
        fs::read_to_string(staging.join("shiny.pal")).unwrap(),
        expected
    );
    assert!(stdout.contains("\tRGB 31, 31, 19"));
}

#[test]
fn test_shiny_with_one_color_fails() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("flat.png");
    RgbaImage::from_pixel(2, 2, PINK).save(&input).unwrap();

    let (_, stderr, code) = run_composer(
        temp.path(),
        &["shiny", input.to_str().unwrap(), "-o", "flat.pal"],
    );
    assert_eq!(code, 1);
    assert!(stderr.contains("found 1"), "stderr: {}", stderr);
    assert!(!temp.path().join("flat.pal").exists());
}

// ============================================================================
// recolor
// ============================================================================

#[test]
fn test_recolor_default_and_swapped() {
    let temp = staging_dir();
    let staging = temp.path().join("pokemon-sprites-staging");
    let mut back = RgbaImage::from_pixel(4, 4, Rgba([255, 255, 255, 0]));
    back.put_pixel(1, 1, RED);
    back.put_pixel(2, 2, ORANGE);
    back.put_pixel(0, 3, BLACK);
    let mut shiny = back.clone();
    shiny.put_pixel(1, 1, PINK);
    shiny.put_pixel(2, 2, CREAM);
    back.save(staging.join("back.png")).unwrap();
    shiny.save(staging.join("shiny.png")).unwrap();

    let (_, stderr, code) = run_composer(temp.path(), &["recolor"]);
    assert_eq!(code, 0, "recolor failed: {}", stderr);
    let recolored = load(&staging.join("back_shiny.png"));
    assert_eq!(recolored, shiny);

    let (_, stderr, code) = run_composer(temp.path(), &["recolor", "--swap"]);
    assert_eq!(code, 0, "recolor --swap failed: {}", stderr);
    let inverted = load(&staging.join("back_inverted.png"));
    assert_eq!(*inverted.get_pixel(1, 1), CREAM);
    assert_eq!(*inverted.get_pixel(2, 2), PINK);
    assert_eq!(*inverted.get_pixel(0, 3), BLACK);
}

// ============================================================================
// anim
// ============================================================================

#[test]
fn test_anim_splits_gif() {
    let temp = staging_dir();
    let staging = temp.path().join("pokemon-sprites-staging");
    write_gif(
        &staging.join("front.gif"),
        &[
            (RgbaImage::from_pixel(5, 4, RED), 100),
            (RgbaImage::from_pixel(5, 4, ORANGE), 50),
            (RgbaImage::from_pixel(5, 4, BLACK), 1000),
        ],
    );

    let (_, stderr, code) = run_composer(temp.path(), &["anim"]);
    assert_eq!(code, 0, "anim failed: {}", stderr);

    assert_eq!(
        fs::read_to_string(staging.join("anim.asm")).unwrap(),
        "\tframe 0, 06\n\tframe 1, 03\n\tframe 2, 60\n\tendanim"
    );
    let sheet = load(&staging.join("front.png"));
    assert_eq!(sheet.dimensions(), (5, 12));
    assert_eq!(*sheet.get_pixel(0, 0), RED);
    assert_eq!(*sheet.get_pixel(4, 7), ORANGE);
    assert_eq!(*sheet.get_pixel(2, 11), BLACK);
}

#[test]
fn test_anim_staging_override() {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join("abra")).unwrap();
    write_gif(
        &temp.path().join("abra/front.gif"),
        &[(RgbaImage::from_pixel(2, 2, RED), 200)],
    );

    let (_, stderr, code) = run_composer(temp.path(), &["--staging", "abra", "anim"]);
    assert_eq!(code, 0, "anim failed: {}", stderr);
    assert_eq!(
        fs::read_to_string(temp.path().join("abra/anim.asm")).unwrap(),
        "\tframe 0, 12\n\tendanim"
    );
    assert!(temp.path().join("abra/front.png").exists());
}

#[test]
fn test_anim_missing_gif_fails() {
    let temp = staging_dir();
    let (_, stderr, code) = run_composer(temp.path(), &["anim"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("front.gif"), "stderr: {}", stderr);
}

// ============================================================================
// bundle
// ============================================================================

fn read_entry(archive: &Path, entry: &str) -> Vec<u8> {
    let mut zip = ZipArchive::new(File::open(archive).unwrap()).unwrap();
    let mut bytes = Vec::new();
    zip.by_name(entry).unwrap().read_to_end(&mut bytes).unwrap();
    bytes
}

/// Staging dir holding a two-frame front.gif plus matching back and shiny sprites.
fn bundle_staging() -> TempDir {
    let temp = staging_dir();
    let staging = temp.path().join("pokemon-sprites-staging");
    write_gif(
        &staging.join("front.gif"),
        &[
            (messy_sprite(ORANGE, RED), 100),
            (messy_sprite(RED, ORANGE), 500),
        ],
    );
    messy_sprite(ORANGE, RED)
        .save(staging.join("back.png"))
        .unwrap();
    messy_sprite(CREAM, PINK)
        .save(staging.join("shiny.png"))
        .unwrap();
    temp
}

#[test]
fn test_bundle_writes_both_archives() {
    let temp = bundle_staging();
    let staging = temp.path().join("pokemon-sprites-staging");

    let (stdout, stderr, code) = run_composer(
        temp.path(),
        &["bundle", "abra", "--credits", "Sprites by Someone"],
    );
    assert_eq!(code, 0, "bundle failed: {}", stderr);
    assert!(stdout.contains("abra.zip"), "stdout: {}", stdout);

    let archive = staging.join("abra.zip");
    let data: serde_json::Value =
        serde_json::from_slice(&read_entry(&archive, "data.json")).unwrap();
    assert_eq!(
        data["animationFrameDurations"],
        serde_json::json!([100, 500])
    );
    assert_eq!(data["credits"], "Sprites by Someone");
    assert_eq!(data["palette"]["color1"]["first"], "#c82828");
    assert_eq!(data["palette"]["color1"]["second"], "#d868c8");
    assert_eq!(data["palette"]["color2"]["first"], "#f8a040");
    assert_eq!(data["palette"]["color2"]["second"], "#ffff98");

    let front = image::load_from_memory(&read_entry(&archive, "animation/1.png"))
        .unwrap()
        .to_rgba8();
    assert_eq!(front.dimensions(), (6, 6));
    assert_eq!(front.get_pixel(0, 0)[3], 0, "frames are fixed up");
    assert_eq!(*front.get_pixel(1, 2), BLACK);
    assert_eq!(*front.get_pixel(2, 3), RED);

    let v08 = staging.join("abra-v08.zip");
    let stacked = image::load_from_memory(&read_entry(&v08, "front.png"))
        .unwrap()
        .to_rgba8();
    assert_eq!(stacked.dimensions(), (6, 12));
    assert_eq!(
        read_entry(&v08, "anim.asm"),
        b"\tframe 0, 06\n\tframe 1, 30\n\tendanim"
    );
    assert_eq!(read_entry(&v08, "credits.txt"), b"Sprites by Someone");
    assert_eq!(
        read_entry(&v08, "shiny.pal"),
        b"\n\tRGB 31, 20, 08\n\tRGB 27, 13, 25\n"
    );
}

#[test]
fn test_bundle_output_and_preview_dirs() {
    let temp = bundle_staging();

    let (_, stderr, code) = run_composer(
        temp.path(),
        &[
            "bundle",
            "abra",
            "-o",
            "out",
            "--preview",
            "preview",
            "--swap",
        ],
    );
    assert_eq!(code, 0, "bundle failed: {}", stderr);

    let archive = temp.path().join("out/abra.zip");
    let data: serde_json::Value =
        serde_json::from_slice(&read_entry(&archive, "data.json")).unwrap();
    assert_eq!(data["palette"]["color1"]["second"], "#ffff98");
    assert_eq!(data["credits"], "");
    assert!(temp.path().join("out/abra-v08.zip").exists());

    let inverted = load(&temp.path().join("preview/front_0_inverted.png"));
    assert_eq!(*inverted.get_pixel(2, 3), PINK);
    assert_eq!(*inverted.get_pixel(3, 4), CREAM);
    assert!(temp.path().join("preview/back_shiny.png").exists());
}

#[test]
fn test_bundle_missing_sprite_fails() {
    let temp = staging_dir();
    let (_, stderr, code) = run_composer(temp.path(), &["bundle", "abra"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("front.gif"), "stderr: {}", stderr);
    let archive = temp.path().join("pokemon-sprites-staging/abra.zip");
    assert!(!archive.exists());
}

#[test]
fn test_bundle_empty_name_is_rejected() {
    let temp = bundle_staging();
    let (_, stderr, code) = run_composer(temp.path(), &["bundle", ""]);
    assert_eq!(code, 2);
    assert!(stderr.contains("name"), "stderr: {}", stderr);
}
