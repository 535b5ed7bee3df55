use reel_harvest::engine::normalization::{
    clean_text, full_size_poster, iso_duration_to_runtime, join_list, title_url,
};

// * Test Suite for value normalization

#[test]
fn test_duration_to_runtime() {
    assert_eq!(iso_duration_to_runtime("PT2H15M"), "2h 15m");
    assert_eq!(iso_duration_to_runtime("PT45M"), "45m");
}

#[test]
fn test_poster_rewritten_to_full_size() {
    let thumb = "https://m.media-amazon.com/images/M/MV5BMTkxNTk1ODcxNl5BMl5BanBnXkFtZTcwMDI1OTMzOQ@@._V1_UX182_CR0,0,182,268_AL_.jpg";
    assert_eq!(
        full_size_poster(thumb),
        "https://m.media-amazon.com/images/M/MV5BMTkxNTk1ODcxNl5BMl5BanBnXkFtZTcwMDI1OTMzOQ@@.jpg"
    );
}

#[test]
fn test_poster_idempotent_and_passthrough() {
    let full = "https://m.media-amazon.com/images/M/MV5BMTkxNTk1ODcxNl5BMl5BanBnXkFtZTcwMDI1OTMzOQ@@.jpg";
    assert_eq!(full_size_poster(full), full);
    assert_eq!(full_size_poster("https://example.com/poster.png"), "https://example.com/poster.png");
    assert_eq!(full_size_poster("NA"), "NA");
}

#[test]
fn test_clean_text_never_empty_input_safe() {
    assert_eq!(clean_text(""), "");
    assert_eq!(clean_text("\n\n"), "");
    assert_eq!(clean_text("Crime; Drama"), "Crime Drama");
}

#[test]
fn test_join_list() {
    let genres = vec!["Action".to_string(), " Crime ".to_string(), "".to_string()];
    assert_eq!(join_list(&genres), "Action, Crime");
    assert_eq!(join_list(&[]), "NA");
}

#[test]
fn test_title_url() {
    assert_eq!(
        title_url("https://www.imdb.com", "tt0111161").as_deref(),
        Some("https://www.imdb.com/title/tt0111161/")
    );
    assert_eq!(
        title_url("http://127.0.0.1:8080/mirror", "tt1").as_deref(),
        Some("http://127.0.0.1:8080/mirror/title/tt1/")
    );
    assert!(title_url("not a url", "tt1").is_none());
}
