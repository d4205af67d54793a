//! Command line surface.

use clap::{Args, Parser, Subcommand};

use catalog_search_shared::{EntityType, RawQuery};

#[derive(Parser, Debug)]
#[command(name = "catalog-search")]
#[command(about = "Search layer over the event catalog", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Register indexes, resync them and monitor availability until Ctrl-C
    Serve,
    /// Rebuild indexes from the live rows of the store
    Resync {
        /// Only resync this entity type
        #[arg(long)]
        entity: Option<EntityType>,
    },
    /// Run one search and print the result envelope as JSON
    Search(SearchArgs),
}

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Entity type to search (event, artist, venue, organizer)
    #[arg(long)]
    pub entity: EntityType,

    /// Free text
    #[arg(long)]
    pub q: Option<String>,

    /// Comma-separated categories (genres for artists)
    #[arg(long)]
    pub category: Option<String>,

    #[arg(long)]
    pub city: Option<String>,

    /// YYYY-MM-DD or RFC 3339
    #[arg(long)]
    pub date_from: Option<String>,

    /// YYYY-MM-DD or RFC 3339
    #[arg(long)]
    pub date_to: Option<String>,

    #[arg(long)]
    pub max_price: Option<f64>,

    #[arg(long, allow_negative_numbers = true)]
    pub lat: Option<f64>,

    #[arg(long, allow_negative_numbers = true)]
    pub lng: Option<f64>,

    #[arg(long)]
    pub radius_km: Option<f64>,

    /// relevance, natural or popularity
    #[arg(long)]
    pub sort: Option<String>,

    #[arg(long)]
    pub page: Option<u32>,

    #[arg(long)]
    pub limit: Option<u32>,
}

impl SearchArgs {
    pub fn raw_query(&self) -> RawQuery {
        RawQuery {
            q: self.q.clone(),
            category: self.category.clone(),
            city: self.city.clone(),
            date_from: self.date_from.clone(),
            date_to: self.date_to.clone(),
            max_price: self.max_price,
            lat: self.lat,
            lng: self.lng,
            radius_km: self.radius_km,
            sort: self.sort.clone(),
            page: self.page,
            limit: self.limit,
        }
    }
}
