//! Behavior tests for the paginated issue harvest: continuation signals,
//! item caps, throttling retries, and decode failures.

use std::sync::Arc;
use std::time::Duration;

use devpulse_tests::*;

// =============================================================================
// Pagination
// =============================================================================

#[tokio::test]
async fn when_link_header_advertises_next_the_walk_continues() {
    let client = Arc::new(
        ScriptedHttpClient::new()
            .on(
                "issues?page=1",
                vec![Ok(HttpResponse::ok_json(issues_page(&[1, 2]))
                    .with_header("link", next_link(2)))],
            )
            .on(
                "issues?page=2",
                vec![Ok(HttpResponse::ok_json(issues_page(&[3])))],
            ),
    );
    let rig = harvest_rig(Arc::clone(&client));

    let ingested = rig
        .harvester
        .harvest_issues(&repo("golang", "go"), WindowTag::All)
        .await
        .expect("walk succeeds");

    assert_eq!(ingested, 3);
    assert_eq!(client.requested_urls().len(), 2);
    assert_eq!(
        rig.warehouse
            .partition_count(WindowTag::All, EntityKind::Issue)
            .expect("count"),
        3
    );
}

#[tokio::test]
async fn when_no_continuation_is_advertised_the_walk_stops_after_one_page() {
    let client = Arc::new(ScriptedHttpClient::new().on(
        "issues?page=1",
        vec![Ok(HttpResponse::ok_json(issues_page(&[10])))],
    ));
    let rig = harvest_rig(Arc::clone(&client));

    let ingested = rig
        .harvester
        .harvest_issues(&repo("golang", "go"), WindowTag::All)
        .await
        .expect("walk succeeds");

    assert_eq!(ingested, 1);
    assert_eq!(client.requested_urls().len(), 1);
}

// =============================================================================
// Item caps
// =============================================================================

#[tokio::test]
async fn when_the_cap_hits_mid_page_excess_records_are_discarded() {
    let client = Arc::new(ScriptedHttpClient::new().on(
        "issues?page=1",
        vec![Ok(
            HttpResponse::ok_json(issues_page(&[1, 2, 3, 4, 5])).with_header("link", next_link(2))
        )],
    ));
    let rig = harvest_rig(Arc::clone(&client));

    let capped = RepoSpec {
        max_items: Some(3),
        ..repo("golang", "go")
    };
    let ingested = rig
        .harvester
        .harvest_issues(&capped, WindowTag::All)
        .await
        .expect("walk succeeds");

    // Cap reached inside page one, so page two is never requested.
    assert_eq!(ingested, 3);
    assert_eq!(client.requested_urls().len(), 1);
    assert_eq!(
        rig.warehouse
            .partition_count(WindowTag::All, EntityKind::Issue)
            .expect("count"),
        3
    );
}

// =============================================================================
// Windowed partitions
// =============================================================================

#[tokio::test]
async fn when_harvesting_a_window_rows_land_only_in_its_partition() {
    let client = Arc::new(ScriptedHttpClient::new().on(
        "/issues?",
        vec![Ok(HttpResponse::ok_json(issues_page(&[7, 8])))],
    ));
    let rig = harvest_rig(Arc::clone(&client));

    rig.harvester
        .harvest_issues(&repo("golang", "go"), WindowTag::SevenDays)
        .await
        .expect("walk succeeds");

    // The seven-day fetch carries its cutoff upstream.
    assert!(client.requested_urls()[0].contains("since="));

    for window in WindowTag::ALL {
        let expected = if window == WindowTag::SevenDays { 2 } else { 0 };
        assert_eq!(
            rig.warehouse
                .partition_count(window, EntityKind::Issue)
                .expect("count"),
            expected,
            "window {window}"
        );
    }
}

// =============================================================================
// Throttling and failures
// =============================================================================

#[tokio::test]
async fn when_upstream_throttles_the_same_page_is_retried_after_backoff() {
    let client = Arc::new(ScriptedHttpClient::new().on(
        "issues?page=1",
        vec![
            Ok(HttpResponse::throttled()),
            Ok(HttpResponse::throttled()),
            Ok(HttpResponse::ok_json(issues_page(&[1]))),
        ],
    ));
    let rig = harvest_rig(Arc::clone(&client));

    let ingested = rig
        .harvester
        .harvest_issues(&repo("golang", "go"), WindowTag::All)
        .await
        .expect("third attempt succeeds");

    assert_eq!(ingested, 1);
    assert_eq!(
        rig.sleeper.delays(),
        vec![Duration::from_secs(1), Duration::from_secs(2)]
    );
}

#[tokio::test]
async fn when_a_page_fails_to_decode_prior_pages_remain_persisted() {
    let client = Arc::new(
        ScriptedHttpClient::new()
            .on(
                "issues?page=1",
                vec![Ok(HttpResponse::ok_json(issues_page(&[1, 2]))
                    .with_header("link", next_link(2)))],
            )
            .on(
                "issues?page=2",
                vec![Ok(HttpResponse::ok_json("this is not json"))],
            ),
    );
    let rig = harvest_rig(Arc::clone(&client));

    let result = rig
        .harvester
        .harvest_issues(&repo("golang", "go"), WindowTag::All)
        .await;

    assert!(result.is_err(), "decode failure aborts the walk");
    assert_eq!(
        rig.warehouse
            .partition_count(WindowTag::All, EntityKind::Issue)
            .expect("count"),
        2
    );
}

#[tokio::test]
async fn when_a_server_error_occurs_the_walk_fails_without_retry() {
    let client = Arc::new(ScriptedHttpClient::new().on(
        "issues?page=1",
        vec![Ok(HttpResponse {
            status: 502,
            headers: Default::default(),
            body: String::new(),
        })],
    ));
    let rig = harvest_rig(Arc::clone(&client));

    let result = rig
        .harvester
        .harvest_issues(&repo("golang", "go"), WindowTag::All)
        .await;

    assert!(result.is_err());
    assert!(rig.sleeper.delays().is_empty(), "5xx is not retried");
    assert_eq!(client.requested_urls().len(), 1);
}

// =============================================================================
// Metrics
// =============================================================================

#[tokio::test]
async fn when_pages_are_fetched_throughput_counters_accumulate() {
    let client = Arc::new(ScriptedHttpClient::new().on(
        "issues?page=1",
        vec![Ok(HttpResponse::ok_json(issues_page(&[1])))],
    ));
    let rig = harvest_rig(client);

    rig.harvester
        .harvest_issues(&repo("golang", "go"), WindowTag::All)
        .await
        .expect("walk succeeds");

    assert!(rig.metrics.api_calls_value("github", "golang/go", WindowTag::All) > 0.0);
    assert!(rig.metrics.data_collected_value("github", "golang/go", WindowTag::All) > 0.0);
}
