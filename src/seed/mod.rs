use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::info;

use crate::error::AppResult;
use crate::lifecycle::ReturnLifecycle;
use crate::models::ReturnRecord;

static ITEMS: &[&str] = &[
    "Laptop", "Phone", "Tablet", "Headphones", "Monitor", "Keyboard", "Mouse",
    "Camera", "Smartwatch", "Speaker", "Router", "Charger", "Printer", "Drone",
    "Console", "Projector", "Microphone", "Webcam", "E-Reader", "Blender",
];

static REASONS: &[&str] = &[
    "Defective on arrival",
    "Wrong item received",
    "Changed mind",
    "Product not as described",
    "Damaged during shipping",
    "Missing parts",
    "Quality below expectations",
    "Found better price elsewhere",
    "No longer needed",
    "Gift recipient already has it",
];

/// Random item name with a serial suffix so seeded rows are distinguishable.
fn random_item(rng: &mut impl Rng, serial: usize) -> String {
    let item = ITEMS.choose(rng).unwrap_or(&"Widget");
    format!("{} #{:05}", item, serial)
}

fn random_reason(rng: &mut impl Rng) -> String {
    REASONS.choose(rng).unwrap_or(&"Other").to_string()
}

/// Create `count` random returns through the lifecycle, so seeded ids follow
/// the same allocation policy as regular creates.
pub async fn seed_returns(lifecycle: &ReturnLifecycle, count: usize) -> AppResult<Vec<ReturnRecord>> {
    info!("Seeding {} returns...", count);

    // StdRng is Send + Sync, so it can live across await points
    let mut rng = StdRng::from_entropy();
    let mut created = Vec::with_capacity(count);

    for serial in 0..count {
        let item = random_item(&mut rng, serial);
        let reason = random_reason(&mut rng);
        created.push(lifecycle.create(&item, &reason).await?);
    }

    info!("Seeding complete. Total: {} returns", created.len());
    Ok(created)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::db::InMemoryReturnRepository;
    use crate::models::ReturnStatus;

    #[tokio::test]
    async fn seeds_pending_returns_with_sequential_ids() {
        let lifecycle = ReturnLifecycle::new(Arc::new(InMemoryReturnRepository::new()));
        let seeded = seed_returns(&lifecycle, 25).await.unwrap();

        assert_eq!(seeded.len(), 25);
        let ids: Vec<i64> = seeded.iter().map(|r| r.id).collect();
        assert_eq!(ids, (1..=25).collect::<Vec<i64>>());
        assert!(seeded.iter().all(|r| r.status == ReturnStatus::Pending));
        assert!(seeded.iter().all(|r| REASONS.contains(&r.reason.as_str())));
    }

    #[tokio::test]
    async fn seeding_reuses_released_ids_first() {
        let lifecycle = ReturnLifecycle::new(Arc::new(InMemoryReturnRepository::new()));
        seed_returns(&lifecycle, 5).await.unwrap();
        lifecycle.delete(2).await.unwrap();

        let seeded = seed_returns(&lifecycle, 2).await.unwrap();
        assert_eq!(seeded[0].id, 2);
        assert_eq!(seeded[1].id, 6);
    }

    #[test]
    fn item_names_carry_serial() {
        let mut rng = StdRng::seed_from_u64(7);
        let name = random_item(&mut rng, 42);
        assert!(name.ends_with("#00042"), "{}", name);
    }
}
