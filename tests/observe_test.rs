use cookiestore::cookies::entry::{CookieAttributes, Expires};
use cookiestore::observe::change::ChangeType;
use cookiestore::observe::notifier::Subscription;
use cookiestore::store::matcher::CookieQuery;
use cookiestore::store::service::CookieStore;
use time::{Duration, OffsetDateTime};
use url::Url;

fn secure_store() -> CookieStore {
    CookieStore::new(Url::parse("https://example.org/").unwrap()).unwrap()
}

/// Drain batches until `n` events have been observed, preserving order.
async fn collect_events(
    sub: &mut Subscription,
    n: usize,
) -> Vec<cookiestore::observe::change::CookieChange> {
    let mut events = Vec::new();
    while events.len() < n {
        let batch = sub.next_batch().await.expect("subscription closed early");
        events.extend(batch);
    }
    events
}

#[tokio::test]
async fn test_initial_snapshot_is_empty_on_fresh_store() {
    let store = secure_store();
    let mut sub = store.observe(Vec::new());

    // The very first batch is the snapshot: delivered, and empty.
    let snapshot = sub.next_batch().await.unwrap();
    assert!(snapshot.is_empty());

    // A real change only arrives afterwards.
    store.set("SID", "v").await.unwrap();
    let batch = sub.next_batch().await.unwrap();
    assert_eq!(batch.len(), 1);
    assert_eq!(batch[0].name, "SID");
    assert_eq!(batch[0].change_type, ChangeType::Visible);
}

#[tokio::test]
async fn test_initial_snapshot_lists_existing_cookies() {
    let store = secure_store();
    store.set("A", "1").await.unwrap();
    store.set("B", "2").await.unwrap();

    let mut sub = store.observe(Vec::new());
    let snapshot = sub.next_batch().await.unwrap();

    let names: Vec<&str> = snapshot.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, ["A", "B"]);
    assert!(snapshot.iter().all(|e| e.change_type == ChangeType::Visible));
    assert!(snapshot.iter().all(|e| e.all.len() == 2));
}

#[tokio::test]
async fn test_visible_event_carries_value_and_scope_set() {
    let store = secure_store();
    let mut sub = store.observe(vec![CookieQuery::named("SID")]);
    assert!(sub.next_batch().await.unwrap().is_empty());

    store.set("UNRELATED", "x").await.unwrap();
    store.set("SID", "31d4d96e").await.unwrap();

    let batch = sub.next_batch().await.unwrap();
    assert_eq!(batch.len(), 1);
    let event = &batch[0];
    assert_eq!(event.change_type, ChangeType::Visible);
    assert_eq!(event.name, "SID");
    assert_eq!(event.value.as_deref(), Some("31d4d96e"));
    assert_eq!(event.url, *store.scope());
    // The scope set disambiguates: both cookies are visible there.
    assert_eq!(event.all.len(), 2);
}

#[tokio::test]
async fn test_hidden_event_for_visible_delete_only() {
    let store = secure_store();
    store.set("WATCHED", "v").await.unwrap();
    store.set("IGNORED", "v").await.unwrap();

    let mut sub = store.observe(vec![CookieQuery::named("WATCHED")]);
    assert_eq!(sub.next_batch().await.unwrap().len(), 1);

    // Deleting an entry this interest never saw produces nothing.
    store.delete("IGNORED").await;
    // Deleting the watched entry produces exactly one hidden event.
    store.delete("WATCHED").await;

    let events = collect_events(&mut sub, 1).await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].change_type, ChangeType::Hidden);
    assert_eq!(events[0].name, "WATCHED");
    assert!(events[0].value.is_none());
}

#[tokio::test]
async fn test_events_arrive_in_mutation_order() {
    let store = secure_store();
    let mut sub = store.observe(Vec::new());
    assert!(sub.next_batch().await.unwrap().is_empty());

    store.set("A", "1").await.unwrap();
    store.set("B", "2").await.unwrap();
    store.set("A", "updated").await.unwrap();
    store.delete("B").await;

    let events = collect_events(&mut sub, 4).await;
    let seen: Vec<(ChangeType, &str)> = events
        .iter()
        .map(|e| (e.change_type, e.name.as_str()))
        .collect();
    assert_eq!(
        seen,
        [
            (ChangeType::Visible, "A"),
            (ChangeType::Visible, "B"),
            (ChangeType::Visible, "A"),
            (ChangeType::Hidden, "B"),
        ]
    );
}

#[tokio::test]
async fn test_value_overwrite_reports_visible_again() {
    let store = secure_store();
    store.set("SID", "one").await.unwrap();

    let mut sub = store.observe(vec![CookieQuery::named("SID")]);
    assert_eq!(sub.next_batch().await.unwrap().len(), 1);

    // Same value again: no visibility transition, no event. Then a real
    // change, which must be the next thing delivered.
    store.set("SID", "one").await.unwrap();
    store.set("SID", "two").await.unwrap();

    let events = collect_events(&mut sub, 1).await;
    assert_eq!(events[0].value.as_deref(), Some("two"));
}

#[tokio::test]
async fn test_interest_filtering_by_prefix_and_url() {
    let store = secure_store();
    let auth_url = Url::parse("https://example.org/auth/").unwrap();
    let interests = vec![
        CookieQuery::named("__Secure-COOKIENAME").at_url(store.scope().clone()),
        CookieQuery::name_starts_with("__Host-COOKIEN"),
        CookieQuery::name_starts_with("__Host-AUTHTOKEN").at_url(auth_url.clone()),
    ];
    let mut sub = store.observe(interests);
    assert!(sub.next_batch().await.unwrap().is_empty());

    let secure = CookieAttributes::new().secure(true);
    store
        .set_with("__Host-COOKIENAME", "host-value", &secure)
        .await
        .unwrap();
    let events = collect_events(&mut sub, 1).await;
    assert_eq!(events[0].name, "__Host-COOKIENAME");
    // Matched via the default-scope prefix interest.
    assert_eq!(events[0].url, *store.scope());

    store
        .set_with("__Host-AUTHTOKEN2024", "token", &secure)
        .await
        .unwrap();
    let events = collect_events(&mut sub, 1).await;
    assert_eq!(events[0].name, "__Host-AUTHTOKEN2024");
    assert_eq!(events[0].url, auth_url);

    // A cookie none of the interests cover stays silent; verify by making
    // a covered change afterwards and seeing only that one.
    store.set("UNWATCHED", "x").await.unwrap();
    store
        .set_with("__Secure-COOKIENAME", "s", &secure)
        .await
        .unwrap();
    let events = collect_events(&mut sub, 1).await;
    assert_eq!(events[0].name, "__Secure-COOKIENAME");
}

#[tokio::test]
async fn test_expiry_sweep_reports_hidden() {
    let store = secure_store();
    let mut sub = store.observe(vec![CookieQuery::named("SHORTLIVED")]);
    assert!(sub.next_batch().await.unwrap().is_empty());

    store
        .set_with(
            "SHORTLIVED",
            "v",
            &CookieAttributes::new().expires(Expires::At(
                OffsetDateTime::now_utc() + Duration::milliseconds(200),
            )),
        )
        .await
        .unwrap();
    let events = collect_events(&mut sub, 1).await;
    assert_eq!(events[0].change_type, ChangeType::Visible);

    tokio::time::sleep(std::time::Duration::from_millis(300)).await;

    // The read sweeps the expired entry and the transition is observed.
    assert!(store.get("SHORTLIVED").await.is_none());
    let events = collect_events(&mut sub, 1).await;
    assert_eq!(events[0].change_type, ChangeType::Hidden);
    assert_eq!(events[0].name, "SHORTLIVED");
}

#[tokio::test]
async fn test_expired_overwrite_reports_hidden() {
    let store = secure_store();
    store.set("SID", "live").await.unwrap();

    let mut sub = store.observe(vec![CookieQuery::named("SID")]);
    assert_eq!(sub.next_batch().await.unwrap().len(), 1);

    // Writing with a past expiry clears the entry; observers see hidden.
    store
        .set_with(
            "SID",
            "EXPIRED",
            &CookieAttributes::new().expires(Expires::At(OffsetDateTime::now_utc())),
        )
        .await
        .unwrap();

    let events = collect_events(&mut sub, 1).await;
    assert_eq!(events[0].change_type, ChangeType::Hidden);
    assert!(events[0].value.is_none());
}

#[tokio::test]
async fn test_unsubscribe_is_idempotent_and_closes_the_stream() {
    let store = secure_store();
    let mut sub = store.observe(Vec::new());
    assert!(sub.next_batch().await.unwrap().is_empty());

    store.set("SID", "v").await.unwrap();

    store.unsubscribe(&sub);
    store.unsubscribe(&sub);

    // Already-delivered batches stay readable; then the stream ends and
    // later mutations reach nobody.
    store.set("AFTER", "x").await.unwrap();
    let mut drained = Vec::new();
    while let Some(batch) = sub.next_batch().await {
        drained.extend(batch);
    }
    assert!(drained.iter().all(|e| e.name != "AFTER"));
}

#[tokio::test]
async fn test_two_observers_filter_independently() {
    let store = secure_store();
    let mut all_sub = store.observe(Vec::new());
    let mut named_sub = store.observe(vec![CookieQuery::named("B")]);
    assert!(all_sub.next_batch().await.unwrap().is_empty());
    assert!(named_sub.next_batch().await.unwrap().is_empty());

    store.set("A", "1").await.unwrap();
    store.set("B", "2").await.unwrap();

    let all_events = collect_events(&mut all_sub, 2).await;
    assert_eq!(all_events.len(), 2);

    let named_events = collect_events(&mut named_sub, 1).await;
    assert_eq!(named_events.len(), 1);
    assert_eq!(named_events[0].name, "B");
}

#[tokio::test]
async fn test_subscription_is_a_stream() {
    use futures::StreamExt;

    let store = secure_store();
    let sub = store.observe(Vec::new());
    store.set("SID", "v").await.unwrap();

    let batches: Vec<_> = sub.take(2).collect().await;
    assert!(batches[0].is_empty());
    assert_eq!(batches[1][0].name, "SID");
}
