//! Steps shared by the HTTP behaviour suites.

use rstest_bdd_macros::{given, then, when};

use super::HttpWorld;

#[given("{user} has signed up")]
fn has_signed_up(world: &mut HttpWorld, user: String) {
    let status = world.sign_up(&user).status;
    assert_eq!(status, 201, "sign-up for {user} should succeed");
}

#[given("{user} creates the organization \"{name}\"")]
fn has_created_organization(world: &mut HttpWorld, user: String, name: String) {
    let status = world.create_organization(&user, &name).status;
    assert_eq!(status, 201);
}

#[when("{user} creates the organization \"{name}\"")]
fn creates_organization(world: &mut HttpWorld, user: String, name: String) {
    world.create_organization(&user, &name);
}

#[given("{user} adds the site \"{url}\" to {owner}'s first organization")]
fn has_added_site(world: &mut HttpWorld, user: String, url: String, owner: String) {
    let status = world.create_site(&user, &owner, &url).status;
    assert_eq!(status, 201);
}

#[when("{user} adds the site \"{url}\" to {owner}'s first organization")]
fn adds_site(world: &mut HttpWorld, user: String, url: String, owner: String) {
    world.create_site(&user, &owner, &url);
}

#[when("{user} lists the sites of {owner}'s first organization")]
fn lists_sites(world: &mut HttpWorld, user: String, owner: String) {
    let organization_id = world.first_organization_of(&owner);
    world.get(
        Some(&user),
        &format!("/api/v1/organizations/{organization_id}/sites"),
    );
}

#[when("{user} signs in with the password \"{password}\"")]
fn signs_in(world: &mut HttpWorld, user: String, password: String) {
    let email = format!("{}@example.com", user.to_lowercase());
    world.post(
        Some(&user),
        "/api/v1/sign-in",
        serde_json::json!({ "email": email, "password": password }),
    );
}

#[then("the request fails with status {status}")]
fn request_fails(world: &mut HttpWorld, status: u16) {
    let last = world.last();
    assert_eq!(last.status, status, "unexpected response {:?}", last.body);
    assert!(last.body["message"].is_string(), "error envelope expected");
}
