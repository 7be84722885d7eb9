//! Saved tender, market analysis and search history tests on an in-memory store.

mod common;

use common::store_explorer;
use ted_explorer_sdk::{
    NewMarketAnalysis, NewSavedTender, NoticeType, SearchFilters, SearchResult, TedError,
};

fn hit(id: &str) -> SearchResult {
    SearchResult {
        id: id.to_string(),
        title: format!("Tender {}", id),
        date: "2024-02-01".to_string(),
        cpv_code: "72000000".to_string(),
        cpv_description: "IT services".to_string(),
        country: "DEU".to_string(),
        country_name: "Germany".to_string(),
        notice_type: NoticeType::Tender,
        uri: format!("http://data.europa.eu/a4g/resource/notice/{}", id),
    }
}

// ---------------------------------------------------------------------------
// Saved tenders
// ---------------------------------------------------------------------------

#[test]
fn save_copies_search_hit() {
    let explorer = store_explorer();
    let saved = explorer
        .tenders()
        .save("alice", &NewSavedTender::from_result(&hit("100-2024")))
        .unwrap();

    assert!(saved.id > 0);
    assert_eq!(saved.user_id, "alice");
    assert_eq!(saved.ted_id, "100-2024");
    assert_eq!(saved.cpv_code.as_deref(), Some("72000000"));
    assert_eq!(saved.notice_type.as_deref(), Some("tender"));
    assert_eq!(saved.currency.as_deref(), Some("EUR"));
    assert_eq!(saved.tender_value, None);
    assert!(!saved.is_our_sector);
}

#[test]
fn duplicate_save_is_rejected_and_keeps_one_record() {
    let explorer = store_explorer();
    let tenders = explorer.tenders();
    let first = NewSavedTender::from_result(&hit("200-2024")).value(500.0, "EUR");
    tenders.save("alice", &first).unwrap();

    let again = NewSavedTender::from_result(&hit("200-2024")).value(900.0, "USD");
    let err = tenders.save("alice", &again).unwrap_err();
    assert!(matches!(
        err,
        TedError::DuplicateRecord { ref owner, ref ted_id } if owner == "alice" && ted_id == "200-2024"
    ));

    let all = tenders.list("alice").unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].tender_value, Some(500.0));
}

#[test]
fn owners_are_isolated() {
    let explorer = store_explorer();
    let tenders = explorer.tenders();
    let t = NewSavedTender::from_result(&hit("300-2024"));
    tenders.save("alice", &t).unwrap();
    tenders.save("bob", &t).unwrap();

    assert_eq!(tenders.count("alice").unwrap(), 1);
    assert_eq!(tenders.count("bob").unwrap(), 1);
    assert_eq!(tenders.count("carol").unwrap(), 0);

    let alice_id = tenders.list("alice").unwrap()[0].id;
    assert!(tenders.get("bob", alice_id).unwrap().is_none());
    assert!(!tenders.delete("bob", alice_id).unwrap());
}

#[test]
fn save_validates_input() {
    let explorer = store_explorer();
    let tenders = explorer.tenders();

    let err = tenders
        .save("  ", &NewSavedTender::new("1", "T", "2024-01-01"))
        .unwrap_err();
    assert!(matches!(err, TedError::Validation(_)));

    let err = tenders
        .save("alice", &NewSavedTender::new("", "T", "2024-01-01"))
        .unwrap_err();
    assert!(matches!(err, TedError::Validation(_)));

    let negative = NewSavedTender::new("1", "T", "2024-01-01").value(-1.0, "EUR");
    assert!(matches!(
        tenders.save("alice", &negative),
        Err(TedError::Validation(_))
    ));
    assert_eq!(tenders.count("alice").unwrap(), 0);
}

#[test]
fn toggle_flips_sector_flag() {
    let explorer = store_explorer();
    let tenders = explorer.tenders();
    let saved = tenders
        .save("alice", &NewSavedTender::from_result(&hit("400-2024")))
        .unwrap();

    let on = tenders.toggle_our_sector("alice", saved.id).unwrap();
    assert!(on.is_our_sector);
    let off = tenders.toggle_our_sector("alice", saved.id).unwrap();
    assert!(!off.is_our_sector);

    let set = tenders.set_our_sector("alice", saved.id, true).unwrap();
    assert!(set.is_our_sector);
}

#[test]
fn update_missing_tender_is_not_found() {
    let explorer = store_explorer();
    let err = explorer.tenders().toggle_our_sector("alice", 999).unwrap_err();
    assert!(matches!(err, TedError::NotFound(_)));
}

#[test]
fn update_value_keeps_currency_when_omitted() {
    let explorer = store_explorer();
    let tenders = explorer.tenders();
    let saved = tenders
        .save(
            "alice",
            &NewSavedTender::from_result(&hit("500-2024")).value(10.0, "PLN"),
        )
        .unwrap();

    let updated = tenders.update_value("alice", saved.id, Some(25.5), None).unwrap();
    assert_eq!(updated.tender_value, Some(25.5));
    assert_eq!(updated.currency.as_deref(), Some("PLN"));

    let cleared = tenders.update_value("alice", saved.id, None, Some("EUR")).unwrap();
    assert_eq!(cleared.tender_value, None);
    assert_eq!(cleared.currency.as_deref(), Some("EUR"));
}

#[test]
fn notes_can_be_set_and_cleared() {
    let explorer = store_explorer();
    let tenders = explorer.tenders();
    let saved = tenders
        .save("alice", &NewSavedTender::from_result(&hit("600-2024")))
        .unwrap();

    let noted = tenders.update_notes("alice", saved.id, Some("call back")).unwrap();
    assert_eq!(noted.notes.as_deref(), Some("call back"));
    let cleared = tenders.update_notes("alice", saved.id, None).unwrap();
    assert_eq!(cleared.notes, None);
}

#[test]
fn delete_then_save_again() {
    let explorer = store_explorer();
    let tenders = explorer.tenders();
    let t = NewSavedTender::from_result(&hit("700-2024"));
    let saved = tenders.save("alice", &t).unwrap();

    assert!(tenders.delete("alice", saved.id).unwrap());
    assert!(tenders.get_by_ted_id("alice", "700-2024").unwrap().is_none());
    assert!(tenders.save("alice", &t).is_ok());
}

#[test]
fn list_is_newest_first() {
    let explorer = store_explorer();
    let tenders = explorer.tenders();
    for id in ["a", "b", "c"] {
        tenders
            .save("alice", &NewSavedTender::from_result(&hit(id)))
            .unwrap();
    }
    let ids: Vec<String> = tenders
        .list("alice")
        .unwrap()
        .into_iter()
        .map(|t| t.ted_id)
        .collect();
    assert_eq!(ids, vec!["c", "b", "a"]);
}

// ---------------------------------------------------------------------------
// Market analyses
// ---------------------------------------------------------------------------

#[test]
fn calculate_reflects_current_collection() {
    let explorer = store_explorer();
    let tenders = explorer.tenders();
    let ours = tenders
        .save(
            "alice",
            &NewSavedTender::from_result(&hit("1")).value(1000.0, "EUR").our_sector(true),
        )
        .unwrap();
    tenders
        .save("alice", &NewSavedTender::from_result(&hit("2")).value(3000.0, "EUR"))
        .unwrap();
    tenders
        .save("alice", &NewSavedTender::from_result(&hit("3")).our_sector(true))
        .unwrap();

    let calc = explorer.analyses().calculate("alice").unwrap();
    assert_eq!(calc.total_market_value, 4000.0);
    assert_eq!(calc.our_sector_value, 1000.0);
    assert_eq!(calc.percentage_display(), "25.00");

    tenders.toggle_our_sector("alice", ours.id).unwrap();
    let calc = explorer.analyses().calculate("alice").unwrap();
    assert_eq!(calc.our_sector_value, 0.0);
    assert_eq!(calc.market_share_percentage, 0.0);
}

#[test]
fn saved_analysis_snapshots_figures() {
    let explorer = store_explorer();
    explorer
        .tenders()
        .save(
            "alice",
            &NewSavedTender::from_result(&hit("1")).value(200.0, "EUR").our_sector(true),
        )
        .unwrap();
    explorer
        .tenders()
        .save("alice", &NewSavedTender::from_result(&hit("2")).value(600.0, "EUR"))
        .unwrap();

    let analyses = explorer.analyses();
    let saved = analyses
        .save(
            "alice",
            &NewMarketAnalysis::new("Q1 IT")
                .description("German IT services")
                .countries(&["de", "AT"])
                .cpv_codes(&["72000000"])
                .period(Some("2024-01-01"), Some("2024-03-31")),
        )
        .unwrap();

    assert_eq!(saved.analysis_name, "Q1 IT");
    assert_eq!(saved.total_market_value, Some(800.0));
    assert_eq!(saved.market_share_percentage, Some(25.0));
    assert_eq!(saved.countries, vec!["DEU", "AUT"]);
    assert_eq!(saved.cpv_codes, vec!["72000000"]);

    let fetched = analyses.get("alice", saved.id).unwrap().unwrap();
    assert_eq!(fetched, saved);
    assert_eq!(analyses.list("alice").unwrap().len(), 1);
    assert!(analyses.list("bob").unwrap().is_empty());

    assert!(analyses.delete("alice", saved.id).unwrap());
    assert!(analyses.get("alice", saved.id).unwrap().is_none());
}

#[test]
fn analysis_requires_name_and_valid_filters() {
    let explorer = store_explorer();
    let analyses = explorer.analyses();

    assert!(matches!(
        analyses.save("alice", &NewMarketAnalysis::new("  ")),
        Err(TedError::Validation(_))
    ));
    assert!(matches!(
        analyses.save("alice", &NewMarketAnalysis::new("x").countries(&["Germany"])),
        Err(TedError::Validation(_))
    ));
    assert!(matches!(
        analyses.save("alice", &NewMarketAnalysis::new("x").cpv_codes(&["IT services"])),
        Err(TedError::Validation(_))
    ));
    assert!(matches!(
        analyses.save(
            "alice",
            &NewMarketAnalysis::new("x").period(Some("2024-02-31"), None)
        ),
        Err(TedError::Validation(_))
    ));
    assert!(analyses.list("alice").unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Search history
// ---------------------------------------------------------------------------

#[test]
fn history_round_trips_filters() {
    let explorer = store_explorer();
    let history = explorer.history();
    let filters = SearchFilters::new()
        .keywords("bridge")
        .notice_type(NoticeType::Tender)
        .country("NL")
        .page(2);

    let entry = history
        .record("alice", &filters, Some("bridges"), Some(42))
        .unwrap();
    assert_eq!(entry.search_filters, filters);
    assert_eq!(entry.search_name.as_deref(), Some("bridges"));
    assert_eq!(entry.results_count, Some(42));

    history.record("alice", &SearchFilters::new(), None, None).unwrap();
    let listed = history.list("alice", None).unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[1].search_filters, filters);

    assert_eq!(history.list("alice", Some(1)).unwrap().len(), 1);
    assert_eq!(history.clear("alice").unwrap(), 2);
    assert!(history.list("alice", None).unwrap().is_empty());
}

#[test]
fn filters_serialize_with_wire_names() {
    let filters = SearchFilters::new()
        .notice_type(NoticeType::Notice)
        .date_from("2024-01-01")
        .page_size(25);
    let json = serde_json::to_value(&filters).unwrap();
    assert_eq!(
        json,
        serde_json::json!({"type": "notice", "dateFrom": "2024-01-01", "pageSize": 25})
    );
}
