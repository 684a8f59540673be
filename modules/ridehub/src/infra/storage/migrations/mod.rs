use sea_orm_migration::prelude::*;

mod initial_001;
mod rides_002;
mod strava_003;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(initial_001::Migration),
            Box::new(rides_002::Migration),
            Box::new(strava_003::Migration),
        ]
    }
}
