//! Seeded catalog shared by unit tests

use crate::db::{CatalogRepository, Database};
use chrono::NaiveDate;

pub struct SeededCatalog {
    pub db: Database,
    pub action: i64,
    pub drama: i64,
    pub comedy: i64,
    pub usa: i64,
    pub uk: i64,
    pub france: i64,
    pub brazil: i64,
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// Action: Rocket (1.5M, US+UK), Blast (500K, US), Orphan (100K, no country)
/// Drama: Quiet (300K, France), Samba (200K, Brazil)
/// Comedy: Samba
pub fn seeded_catalog() -> SeededCatalog {
    let db = Database::open_in_memory().unwrap();
    let repo = CatalogRepository::new(db.conn());

    let action = repo.insert_genre("Action").unwrap();
    let drama = repo.insert_genre("Drama").unwrap();
    let comedy = repo.insert_genre("Comedy").unwrap();

    let usa = repo.insert_country("United States of America").unwrap();
    let uk = repo.insert_country("United Kingdom").unwrap();
    let france = repo.insert_country("France").unwrap();
    let brazil = repo.insert_country("Brazil").unwrap();

    repo.insert_movie("Rocket", 1_500_000.0, date("2010-05-01"), &[action], &[usa, uk])
        .unwrap();
    repo.insert_movie("Blast", 500_000.0, date("2008-03-01"), &[action], &[usa])
        .unwrap();
    repo.insert_movie("Orphan", 100_000.0, date("2011-01-01"), &[action], &[])
        .unwrap();
    repo.insert_movie("Quiet", 300_000.0, date("2012-01-01"), &[drama], &[france])
        .unwrap();
    repo.insert_movie("Samba", 200_000.0, date("2015-06-01"), &[comedy, drama], &[brazil])
        .unwrap();

    SeededCatalog {
        db,
        action,
        drama,
        comedy,
        usa,
        uk,
        france,
        brazil,
    }
}
