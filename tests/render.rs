mod common;

use std::time::Duration;

use color_eyre::Result;
use common::{MockGateway, TestHarness, repo, user};
use crossterm::event::KeyCode;
use ghsearch::prelude::*;

fn harness(gateway: MockGateway) -> Result<TestHarness> {
    TestHarness::with_options(SearchOptions::default(), gateway, 40, 6)
}

#[test]
fn idle_shows_only_the_prompt() -> Result<()> {
    let mut h = harness(MockGateway::new())?;
    insta::assert_snapshot!(h.render()?, @">");
    Ok(())
}

#[test]
fn too_short_hint() -> Result<()> {
    let mut h = harness(MockGateway::new())?;
    h.search("ab")?;
    insta::assert_snapshot!(h.render()?, @r"
    > ab
    Type at least 3 characters to search
    ");
    assert_eq!(h.app().cursor_pos, (4, 0));
    Ok(())
}

#[test]
fn results_with_count() -> Result<()> {
    let gateway = MockGateway::new().accounts("smith", vec![user("alice"), user("bob"), user("carol")]);
    let mut h = harness(gateway)?;
    h.search("smith")?;
    h.key(KeyCode::Down)?;
    h.key(KeyCode::Down)?;

    let screen = h.render()?;
    let lines: Vec<&str> = screen.lines().collect();
    assert!(lines[0].starts_with("> smith "));
    assert!(lines[0].ends_with("2/3"));
    assert_eq!(lines[0].chars().count(), 40);
    assert_eq!(&lines[1..], ["  @alice", "> @bob", "  @carol"]);
    Ok(())
}

#[test]
fn repository_rows_show_metadata() -> Result<()> {
    let ratatui = RepositoryResult {
        stars: 12,
        forks: 3,
        language: Some("Rust".into()),
        description: Some("Terminal UIs".into()),
        ..repo("ratatui", "ratatui")
    };
    let gateway = MockGateway::new().repositories("ratatui", vec![ratatui]);
    let mut h = TestHarness::with_options(SearchOptions::default(), gateway, 80, 4)?;
    h.search("ratatui")?;

    let screen = h.render()?;
    let row = screen.lines().nth(1).unwrap_or_default();
    assert!(row.starts_with("  ratatui/ratatui"));
    assert!(row.contains("12"));
    assert!(row.contains("Rust"));
    assert!(row.ends_with("Terminal UIs"));
    Ok(())
}

#[test]
fn error_replaces_the_rows() -> Result<()> {
    let gateway = MockGateway::new()
        .accounts("smith", vec![user("alice")])
        .fail_repositories("smith", RemoteSearchError::rate_limited("API rate limit exceeded"));
    let mut h = harness(gateway)?;
    h.search("smith")?;
    insta::assert_snapshot!(h.render()?, @r"
    > smith
    API rate limit exceeded
    ");
    Ok(())
}

#[test]
fn no_results_message() -> Result<()> {
    let mut h = harness(MockGateway::new())?;
    h.search("xyz123")?;
    insta::assert_snapshot!(h.render()?, @r#"
    > xyz123
    No results found for "xyz123"
    "#);
    Ok(())
}

#[test]
fn searching_shows_a_spinner() -> Result<()> {
    let gateway = MockGateway::new().delay(Duration::from_millis(20));
    let mut h = harness(gateway)?;
    h.type_str("smith")?;
    h.settle_only();

    let screen = h.render()?;
    let lines: Vec<&str> = screen.lines().collect();
    assert!(lines[0].starts_with("> smith"));
    assert!(lines[0].trim_end().len() > "> smith".len(), "spinner on the right");
    assert_eq!(lines[1], "Searching…");

    h.wait_for_fetches()?;
    let screen = h.render()?;
    assert_eq!(screen.lines().next(), Some("> smith"));
    Ok(())
}

#[test]
fn dismissed_dropdown_is_cleared() -> Result<()> {
    let gateway = MockGateway::new().accounts("smith", vec![user("alice")]);
    let mut h = harness(gateway)?;
    h.search("smith")?;
    assert!(h.render()?.contains("@alice"));

    h.key(KeyCode::Esc)?;
    insta::assert_snapshot!(h.render()?, @"> smith");
    Ok(())
}

#[test]
fn keyboard_scrolls_to_the_nearest_edge() -> Result<()> {
    let accounts = (0..10).map(|i| user(&format!("user{i}"))).collect();
    let gateway = MockGateway::new().accounts("user", accounts);
    let mut h = harness(gateway)?;
    h.search("user")?;
    h.render()?;

    for _ in 0..7 {
        h.key(KeyCode::Down)?;
    }
    let screen = h.render()?;
    let lines: Vec<&str> = screen.lines().collect();
    // five visible rows, the highlighted one at the bottom edge
    assert_eq!(&lines[1..], ["  @user2", "  @user3", "  @user4", "  @user5", "> @user6"]);

    for _ in 0..4 {
        h.key(KeyCode::Up)?;
    }
    let screen = h.render()?;
    let lines: Vec<&str> = screen.lines().collect();
    assert_eq!(lines[1], "> @user2", "unchanged offset while the row is visible");
    Ok(())
}
