//! Behaviour-driven tests for release tree staging.

#![cfg(unix)]

mod support;

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use simpleide_release::error::ReleaseError;
use simpleide_release::stager::Stager;
use simpleide_release::version::PackagePath;
use support::{Checkout, mode_of, write_file};

// ---------------------------------------------------------------------------
// World types
// ---------------------------------------------------------------------------

#[derive(Default)]
struct StagingWorld {
    checkout: Option<Checkout>,
    result: Option<Result<(), ReleaseError>>,
}

#[fixture]
fn world() -> StagingWorld {
    StagingWorld::default()
}

fn checkout(world: &StagingWorld) -> &Checkout {
    world.checkout.as_ref().expect("checkout set")
}

fn package(world: &StagingWorld) -> PackagePath {
    let checkout = checkout(world);
    PackagePath::from_project_file(&checkout.config.build_root, &checkout.config.source.project_file())
        .expect("package path derived")
}

// ---------------------------------------------------------------------------
// Step definitions
// ---------------------------------------------------------------------------

#[given("a SimpleIDE checkout")]
fn given_checkout(world: &mut StagingWorld) {
    world.checkout = Some(Checkout::new("1 1 2"));
}

#[given("a stale file \"{name}\" in the package")]
fn given_stale_file(world: &mut StagingWorld, name: String) {
    write_file(&package(world).path().join(name), "stale");
}

#[given("the release template already ships translations")]
fn given_template_translations(world: &mut StagingWorld) {
    let template = checkout(world).config.source.release_template_dir();
    write_file(&template.join("translations/simpleide_de.qm"), "qm");
}

#[when("the release tree is staged")]
fn when_staged(world: &mut StagingWorld) {
    let stager = Stager::new(&checkout(world).config.source, package(world));
    world.result = Some(stager.stage());
}

#[then("the package contains \"{path}\"")]
fn then_contains(world: &mut StagingWorld, path: String) {
    assert!(package(world).path().join(&path).is_file(), "missing {path}");
}

#[then("the package does not contain \"{path}\"")]
fn then_lacks(world: &mut StagingWorld, path: String) {
    assert!(!package(world).path().join(&path).exists(), "unexpected {path}");
}

#[then("\"{path}\" in the package has mode \"{mode}\"")]
fn then_mode(world: &mut StagingWorld, path: String, mode: String) {
    let expected = u32::from_str_radix(&mode, 8).expect("octal mode");
    assert_eq!(mode_of(&package(world).path().join(path)), expected);
}

#[then("staging fails because the destination exists")]
fn then_destination_exists(world: &mut StagingWorld) {
    let result = world.result.as_ref().expect("result set");
    assert!(
        matches!(result, Err(ReleaseError::DestinationExists { .. })),
        "expected DestinationExists, got {result:?}"
    );
}

// ---------------------------------------------------------------------------
// Scenario bindings
// ---------------------------------------------------------------------------

#[scenario(
    path = "tests/features/staging.feature",
    name = "The template, scripts and translations are staged"
)]
fn scenario_full_tree(world: StagingWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/staging.feature",
    name = "A previous package is replaced"
)]
fn scenario_previous_package_replaced(world: StagingWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/staging.feature",
    name = "Translations are never merged into a template copy"
)]
fn scenario_no_translation_merge(world: StagingWorld) {
    let _ = world;
}
