// SPDX-FileCopyrightText: 2026 Pairdrop Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The atomic claim transaction.
//!
//! One `BEGIN IMMEDIATE` transaction covers the whole read-then-write
//! sequence: daily-cap check, eligibility scan, random selection, pair
//! reservation, counter increment, audit append, and device record upsert.
//! Any failed check returns before commit and the implicit rollback leaves
//! no trace. Within a process the tokio-rusqlite background thread already
//! serializes claims; `IMMEDIATE` takes the write lock up front so an
//! independent process on the same file conflicts at BEGIN instead of
//! mid-sequence.

use rand::Rng;
use rand::rngs::StdRng;
use rusqlite::{OptionalExtension, TransactionBehavior, params};

use pairdrop_core::types::{AllocationOutcome, AllocationRequest};
use pairdrop_core::PairdropError;

use crate::database::{Database, is_busy, map_tr_err};
use crate::models::{PAIR_COLUMNS, Pair, pair_from_row};
use crate::queries::pairs::ELIGIBLE_FILTER;

/// Busy/locked conflicts are folded into the success channel inside the
/// closure so the caller never has to dissect the transport error type.
enum TxResult {
    Done(AllocationOutcome),
    Busy,
}

/// Execute one atomic claim attempt.
///
/// Returns [`PairdropError::Conflict`] on a transient busy/locked conflict;
/// the allocator retries those with the same inputs.
pub async fn allocate(
    db: &Database,
    request: AllocationRequest,
    mut rng: StdRng,
) -> Result<AllocationOutcome, PairdropError> {
    let claim_id = uuid::Uuid::new_v4().to_string();
    let result = db
        .connection()
        .call(move |conn| {
            match run_claim_tx(conn, &request, &mut rng, &claim_id) {
                Ok(outcome) => Ok(TxResult::Done(outcome)),
                Err(e) if is_busy(&e) => Ok(TxResult::Busy),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)?;

    match result {
        TxResult::Done(outcome) => Ok(outcome),
        TxResult::Busy => Err(PairdropError::Conflict),
    }
}

/// The transaction body. Synchronous so it is also testable without the
/// background thread.
fn run_claim_tx(
    conn: &mut rusqlite::Connection,
    request: &AllocationRequest,
    rng: &mut StdRng,
    claim_id: &str,
) -> Result<AllocationOutcome, rusqlite::Error> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    // 1. Daily cap. A missing counter reads as zero.
    let count: i64 = tx
        .query_row(
            "SELECT count FROM daily_counts WHERE day = ?1 AND owner_id = ?2",
            params![request.day, request.owner_id.0],
            |row| row.get(0),
        )
        .optional()?
        .unwrap_or(0);
    if count >= i64::from(request.daily_cap) {
        return Ok(AllocationOutcome::CapReached); // rollback on drop
    }

    // 2. Eligible subset, in a stable order so selection is reproducible
    //    under a seeded RNG.
    let eligible: Vec<Pair> = {
        let mut stmt = tx.prepare(&format!(
            "SELECT {PAIR_COLUMNS} FROM pairs
             WHERE owner_id = ?1 AND {ELIGIBLE_FILTER}
             ORDER BY created_at ASC, id ASC"
        ))?;
        let rows = stmt.query_map(params![request.owner_id.0], pair_from_row)?;
        let mut pairs = Vec::new();
        for row in rows {
            pairs.push(row?);
        }
        pairs
    };
    if eligible.is_empty() {
        return Ok(AllocationOutcome::NoPairs);
    }

    // 3. Uniform random selection. A fairness policy: owners cannot bias
    //    exposure by list order, and claims spread across the catalog.
    let mut chosen = eligible[rng.gen_range(0..eligible.len())].clone();

    // 4. Reserve the slot. The pair retires once its usage is exhausted.
    chosen.usage_count += 1;
    chosen.claimed = chosen.usage_count >= chosen.effective_limit();
    chosen.claimed_at = Some(request.now.clone());
    chosen.claimed_by_device = Some(request.device_id.0.clone());
    tx.execute(
        "UPDATE pairs SET usage_count = ?1, claimed = ?2, claimed_at = ?3,
                          claimed_by_device = ?4
         WHERE id = ?5",
        params![
            chosen.usage_count,
            chosen.claimed,
            chosen.claimed_at,
            chosen.claimed_by_device,
            chosen.id,
        ],
    )?;

    // 5. Counter upsert.
    tx.execute(
        "INSERT INTO daily_counts (day, owner_id, count) VALUES (?1, ?2, 1)
         ON CONFLICT (day, owner_id) DO UPDATE SET count = count + 1",
        params![request.day, request.owner_id.0],
    )?;

    // 6. Audit append, capturing the contact handle as of claim time.
    let contact_handle: String = tx.query_row(
        "SELECT contact_handle FROM owners WHERE id = ?1",
        params![request.owner_id.0],
        |row| row.get(0),
    )?;
    tx.execute(
        "INSERT INTO claims (id, pair_id, device_id, owner_id, contact_handle, claimed_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            claim_id,
            chosen.id,
            request.device_id.0,
            request.owner_id.0,
            contact_handle,
            request.now,
        ],
    )?;

    // 7. Device record upsert keyed by (device, owner).
    tx.execute(
        "INSERT INTO device_claims (device_id, owner_id, last_claim_at, last_claim_date,
                                    recent_pair_id, recent_claimed_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT (device_id, owner_id) DO UPDATE SET
             last_claim_at = excluded.last_claim_at,
             last_claim_date = excluded.last_claim_date,
             recent_pair_id = excluded.recent_pair_id,
             recent_claimed_at = excluded.recent_claimed_at",
        params![
            request.device_id.0,
            request.owner_id.0,
            request.now,
            request.day,
            chosen.id,
            request.now,
        ],
    )?;

    tx.commit()?;
    Ok(AllocationOutcome::Claimed(chosen))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::counters::daily_count;
    use crate::queries::device_claims::get_device_claim;
    use crate::queries::owners::create_owner;
    use crate::queries::pairs::{get_pair, insert_pair, soft_delete};
    use pairdrop_core::types::{DeviceId, OwnerId};
    use rand::SeedableRng;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, String, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db = Database::open(dir.path().join("t.db").to_str().unwrap())
            .await
            .unwrap();
        let owner = create_owner(&db, "Ada", "2348012345678").await.unwrap();
        (db, owner.id, dir)
    }

    fn request(device: &str, owner: &str, day: &str, cap: u32) -> AllocationRequest {
        AllocationRequest {
            device_id: DeviceId(device.to_string()),
            owner_id: OwnerId(owner.to_string()),
            day: day.to_string(),
            now: format!("{day}T12:00:00.000Z"),
            daily_cap: cap,
        }
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(1)
    }

    #[tokio::test]
    async fn successful_claim_writes_the_whole_ledger() {
        let (db, owner, _dir) = setup_db().await;
        let p1 = insert_pair(&db, &owner, "https://a", "msg-a", None).await.unwrap();
        soft_delete(
            &db,
            &insert_pair(&db, &owner, "https://b", "msg-b", None).await.unwrap().id,
        )
        .await
        .unwrap();

        let outcome = allocate(&db, request("dev_x", &owner, "2026-03-14", 1), rng())
            .await
            .unwrap();
        let claimed = match outcome {
            AllocationOutcome::Claimed(pair) => pair,
            other => panic!("expected claim, got {other:?}"),
        };
        // Only P1 was eligible.
        assert_eq!(claimed.id, p1.id);
        assert!(claimed.claimed, "single-use pair retires on first claim");

        assert_eq!(daily_count(&db, "2026-03-14", &owner).await.unwrap(), 1);
        let record = get_device_claim(&db, "dev_x", &owner).await.unwrap().unwrap();
        assert_eq!(record.last_claim_date, "2026-03-14");
        assert_eq!(record.recent_pair_id, p1.id);

        let stored = get_pair(&db, &p1.id).await.unwrap().unwrap();
        assert!(stored.claimed);
        assert_eq!(stored.claimed_by_device.as_deref(), Some("dev_x"));
        assert_eq!(stored.usage_count, 1);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn cap_reached_leaves_no_trace() {
        let (db, owner, _dir) = setup_db().await;
        insert_pair(&db, &owner, "https://a", "a", None).await.unwrap();
        insert_pair(&db, &owner, "https://b", "b", None).await.unwrap();

        let first = allocate(&db, request("dev_x", &owner, "2026-03-14", 1), rng())
            .await
            .unwrap();
        assert!(matches!(first, AllocationOutcome::Claimed(_)));

        // A different device hits the cap; nothing else is written.
        let second = allocate(&db, request("dev_y", &owner, "2026-03-14", 1), rng())
            .await
            .unwrap();
        assert!(matches!(second, AllocationOutcome::CapReached));
        assert_eq!(daily_count(&db, "2026-03-14", &owner).await.unwrap(), 1);
        assert!(get_device_claim(&db, "dev_y", &owner).await.unwrap().is_none());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn empty_catalog_reports_no_pairs() {
        let (db, owner, _dir) = setup_db().await;
        let outcome = allocate(&db, request("dev_x", &owner, "2026-03-14", 1), rng())
            .await
            .unwrap();
        assert!(matches!(outcome, AllocationOutcome::NoPairs));
        assert_eq!(daily_count(&db, "2026-03-14", &owner).await.unwrap(), 0);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn day_rollover_resets_the_cap() {
        let (db, owner, _dir) = setup_db().await;
        insert_pair(&db, &owner, "https://a", "a", None).await.unwrap();
        insert_pair(&db, &owner, "https://b", "b", None).await.unwrap();

        let d1 = allocate(&db, request("dev_x", &owner, "2026-03-14", 1), rng())
            .await
            .unwrap();
        assert!(matches!(d1, AllocationOutcome::Claimed(_)));
        let blocked = allocate(&db, request("dev_x", &owner, "2026-03-14", 1), rng())
            .await
            .unwrap();
        assert!(matches!(blocked, AllocationOutcome::CapReached));

        // Next day: counter is keyed per day, so the same device claims again.
        let d2 = allocate(&db, request("dev_x", &owner, "2026-03-15", 1), rng())
            .await
            .unwrap();
        assert!(matches!(d2, AllocationOutcome::Claimed(_)));
        assert_eq!(daily_count(&db, "2026-03-14", &owner).await.unwrap(), 1);
        assert_eq!(daily_count(&db, "2026-03-15", &owner).await.unwrap(), 1);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn owners_do_not_contend_with_each_other() {
        let (db, owner_a, _dir) = setup_db().await;
        let owner_b = create_owner(&db, "Bea", "2347000000000").await.unwrap().id;
        insert_pair(&db, &owner_a, "https://a", "a", None).await.unwrap();
        insert_pair(&db, &owner_b, "https://b", "b", None).await.unwrap();

        let a = allocate(&db, request("dev_x", &owner_a, "2026-03-14", 1), rng())
            .await
            .unwrap();
        let b = allocate(&db, request("dev_x", &owner_b, "2026-03-14", 1), rng())
            .await
            .unwrap();
        assert!(matches!(a, AllocationOutcome::Claimed(_)));
        assert!(matches!(b, AllocationOutcome::Claimed(_)));

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn counted_pair_serves_its_limit_then_retires() {
        let (db, owner, _dir) = setup_db().await;
        let pair = insert_pair(&db, &owner, "https://a", "a", Some(3)).await.unwrap();

        for day in ["2026-03-14", "2026-03-15", "2026-03-16"] {
            let outcome = allocate(&db, request("dev_x", &owner, day, 1), rng())
                .await
                .unwrap();
            assert!(matches!(outcome, AllocationOutcome::Claimed(_)));
        }

        let stored = get_pair(&db, &pair.id).await.unwrap().unwrap();
        assert_eq!(stored.usage_count, 3);
        assert!(stored.claimed, "retired on the claim that reaches the limit");

        let exhausted = allocate(&db, request("dev_x", &owner, "2026-03-17", 1), rng())
            .await
            .unwrap();
        assert!(matches!(exhausted, AllocationOutcome::NoPairs));

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn selection_is_deterministic_under_a_seed() {
        let (db, owner, _dir) = setup_db().await;
        for i in 0..5 {
            insert_pair(&db, &owner, &format!("https://p/{i}"), "m", None)
                .await
                .unwrap();
        }
        let eligible = crate::queries::pairs::list_eligible(&db, &owner).await.unwrap();

        let seed = 99;
        let expected_index = StdRng::seed_from_u64(seed).gen_range(0..eligible.len());

        let outcome = allocate(
            &db,
            request("dev_x", &owner, "2026-03-14", 1),
            StdRng::seed_from_u64(seed),
        )
        .await
        .unwrap();
        let chosen = match outcome {
            AllocationOutcome::Claimed(pair) => pair,
            other => panic!("expected claim, got {other:?}"),
        };
        assert_eq!(chosen.id, eligible[expected_index].id);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn concurrent_claims_grant_exactly_one_slot() {
        let dir = tempdir().unwrap();
        let db = std::sync::Arc::new(
            Database::open(dir.path().join("t.db").to_str().unwrap())
                .await
                .unwrap(),
        );
        let owner = create_owner(&db, "Ada", "2348012345678").await.unwrap().id;
        for i in 0..4 {
            insert_pair(&db, &owner, &format!("https://p/{i}"), "m", None)
                .await
                .unwrap();
        }

        let mut handles = Vec::new();
        for i in 0..8 {
            let db = db.clone();
            let owner = owner.clone();
            handles.push(tokio::spawn(async move {
                allocate(
                    &db,
                    AllocationRequest {
                        device_id: DeviceId(format!("dev_{i}")),
                        owner_id: OwnerId(owner),
                        day: "2026-03-14".to_string(),
                        now: "2026-03-14T12:00:00.000Z".to_string(),
                        daily_cap: 1,
                    },
                    StdRng::seed_from_u64(i),
                )
                .await
            }));
        }

        let mut successes = 0;
        let mut cap_hits = 0;
        for handle in handles {
            match handle.await.unwrap().unwrap() {
                AllocationOutcome::Claimed(_) => successes += 1,
                AllocationOutcome::CapReached => cap_hits += 1,
                AllocationOutcome::NoPairs => panic!("catalog cannot be empty here"),
            }
        }
        assert_eq!(successes, 1, "exactly one concurrent claim wins the daily slot");
        assert_eq!(cap_hits, 7);
        assert_eq!(daily_count(&db, "2026-03-14", &owner).await.unwrap(), 1);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn single_pair_is_never_double_allocated() {
        let dir = tempdir().unwrap();
        let db = std::sync::Arc::new(
            Database::open(dir.path().join("t.db").to_str().unwrap())
                .await
                .unwrap(),
        );
        let owner = create_owner(&db, "Ada", "2348012345678").await.unwrap().id;
        let pair = insert_pair(&db, &owner, "https://only", "m", None).await.unwrap();

        // Cap high enough that only pair availability decides.
        let mut handles = Vec::new();
        for i in 0..4 {
            let db = db.clone();
            let owner = owner.clone();
            handles.push(tokio::spawn(async move {
                allocate(
                    &db,
                    AllocationRequest {
                        device_id: DeviceId(format!("dev_{i}")),
                        owner_id: OwnerId(owner),
                        day: "2026-03-14".to_string(),
                        now: "2026-03-14T12:00:00.000Z".to_string(),
                        daily_cap: 10,
                    },
                    StdRng::seed_from_u64(i),
                )
                .await
            }));
        }

        let mut winners = Vec::new();
        let mut no_pairs = 0;
        for handle in handles {
            match handle.await.unwrap().unwrap() {
                AllocationOutcome::Claimed(p) => winners.push(p),
                AllocationOutcome::NoPairs => no_pairs += 1,
                AllocationOutcome::CapReached => panic!("cap cannot be the limit here"),
            }
        }
        assert_eq!(winners.len(), 1);
        assert_eq!(winners[0].id, pair.id);
        assert_eq!(no_pairs, 3);

        db.close().await.unwrap();
    }
}
