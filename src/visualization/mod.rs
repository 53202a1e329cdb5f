mod tables;
mod charts;

pub use tables::{
    format_epi, print_epi,
    format_score_table, print_score_table,
    format_fit_table, print_fit_table,
    format_projection_table, print_projection_table,
};
pub use charts::{format_emissions_chart, print_emissions_chart};
