use kit_session::session::{
    DecodeOutcome, SecretEntry, SecretRing, SessionData, UnknownSecretPolicy,
};
use kit_session::settings::SessionSettings;
use kit_session::testing::{
    assert_set_directive, decode_value, TestConfigBuilder, TestFixtures,
};
use kit_session::SessionManager;
use serde_json::{json, Value};

/// Cookie written under `{id: 1, "old"}` read by a ring whose current secret is `{id: 2, "new"}`
#[actix_web::test]
async fn test_admin_session_migrates_to_new_secret() {
    let settings =
        SessionSettings::with_secrets([(2, "new"), (1, "old")]).expires(7);
    let manager = SessionManager::from_settings(&settings, false).expect("valid settings");
    let legacy = TestFixtures::legacy_manager();

    let expires = TestFixtures::expires_in(3600);
    let incoming = TestFixtures::cookie_value(&legacy, json!({ "role": "admin" }), expires).await;
    assert!(incoming.ends_with("&id=1"));

    let session = manager
        .load_value::<Value>(Some(&incoming))
        .await
        .expect("session resolves");

    let read = session.read().expect("session is active");
    assert_eq!(read.data, json!({ "role": "admin" }));
    assert_eq!(read.expires, expires);

    let (outgoing, _) = assert_set_directive(&session);
    let decoded = decode_value::<Value>(&manager, &outgoing).await;
    assert_eq!(decoded.secret_id, 2);
    assert_eq!(decoded.tagged_id, 2);
    assert_eq!(decoded.data, SessionData::new(json!({ "role": "admin" }), expires));
}

#[actix_web::test]
async fn test_rotated_cookie_is_stable_on_next_request() {
    let manager = TestFixtures::rotated_manager();
    let legacy = TestFixtures::legacy_manager();
    let incoming = TestFixtures::cookie_value(
        &legacy,
        TestFixtures::payload(),
        TestFixtures::expires_in(600),
    )
    .await;

    let first = manager.load_value::<Value>(Some(&incoming)).await.unwrap();
    let (migrated, _) = assert_set_directive(&first);

    let second = manager.load_value::<Value>(Some(&migrated)).await.unwrap();
    assert!(!second.flags().should_re_encrypt);
    assert!(second.directive().is_none());
    assert_eq!(second.data(), Some(&TestFixtures::payload()));
}

#[actix_web::test]
async fn test_retired_secret_removed_from_ring_destroys_session() {
    let legacy = TestFixtures::legacy_manager();
    let incoming = TestFixtures::cookie_value(
        &legacy,
        TestFixtures::payload(),
        TestFixtures::expires_in(600),
    )
    .await;

    // Ring no longer knows id 1; the fallback attempts the current secret and fails
    let manager = TestConfigBuilder::new().secrets(&[(3, "newest")]).manager();
    let session = manager.load_value::<Value>(Some(&incoming)).await.unwrap();

    assert!(session.read().is_none());
    assert!(session.flags().should_destroy);
    let cookie = session.finalize().expect("destroy cookie is emitted");
    assert_eq!(cookie.value(), "0");
}

#[actix_web::test]
async fn test_strict_policy_rejects_unknown_ids() {
    let manager = TestConfigBuilder::new()
        .secrets(&[(2, "new")])
        .unknown_secret(UnknownSecretPolicy::Reject)
        .manager();
    let incoming = TestFixtures::cookie_value(
        &manager,
        TestFixtures::payload(),
        TestFixtures::expires_in(600),
    )
    .await;
    let retagged = incoming.replace("&id=2", "&id=5");

    let session = manager.load_value::<Value>(Some(&retagged)).await.unwrap();
    assert!(session.read().is_none());
    assert!(session.flags().should_destroy);
}

#[actix_web::test]
async fn test_lenient_policy_rewrites_stale_tag() {
    let manager = TestConfigBuilder::new().secrets(&[(2, "new")]).manager();
    let incoming = TestFixtures::cookie_value(
        &manager,
        TestFixtures::payload(),
        TestFixtures::expires_in(600),
    )
    .await;
    let retagged = incoming.replace("&id=2", "&id=5");

    let session = manager.load_value::<Value>(Some(&retagged)).await.unwrap();
    assert_eq!(session.data(), Some(&TestFixtures::payload()));
    assert!(session.flags().should_re_encrypt);
    let (outgoing, _) = assert_set_directive(&session);
    assert!(outgoing.ends_with("&id=2"));
}

#[actix_web::test]
async fn test_every_byte_flip_is_rejected() {
    let manager = TestFixtures::manager();
    let ring = SecretRing::new(vec![SecretEntry::new(1, "test_key_32_bytes_long_for_test_")])
        .unwrap();
    let value = TestFixtures::cookie_value(
        &manager,
        TestFixtures::payload(),
        TestFixtures::expires_in(600),
    )
    .await;
    let ciphertext = value.trim_end_matches("&id=1");

    for index in 0..ciphertext.len() {
        let mut bytes = ciphertext.as_bytes().to_vec();
        bytes[index] = if bytes[index] == b'x' { b'y' } else { b'x' };
        let tampered = format!("{}&id=1", String::from_utf8(bytes).unwrap());

        let outcome = manager
            .codec()
            .decode::<Value>(&tampered, &ring, UnknownSecretPolicy::UseCurrent)
            .await;
        assert!(
            matches!(outcome, DecodeOutcome::Failed(_)),
            "flip at {index} was accepted"
        );
    }
}
