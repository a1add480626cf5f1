pub mod campus_hero_worker;

pub use campus_hero_worker::CampusHeroWorker;
