//! Reporting projector: read-only aggregations over the catalog, patrons and
//! the borrow ledger. No invariants of its own.

use std::collections::HashMap;

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    repository::Repository,
};

/// Headline numbers for the dashboard
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookSummary {
    pub total_books: i64,
    pub available_books: i64,
    pub borrowed_books: i64,
    pub category_count: i64,
}

/// One slice of a chart
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChartPoint {
    pub name: String,
    pub count: i64,
}

/// Supported book-stats groupings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsDimension {
    Category,
    Status,
    Year,
}

impl StatsDimension {
    pub fn parse(input: &str) -> AppResult<Self> {
        match input {
            "category" => Ok(StatsDimension::Category),
            "status" => Ok(StatsDimension::Status),
            "year" => Ok(StatsDimension::Year),
            other => Err(AppError::Validation(format!(
                "unsupported stats dimension: {}",
                other
            ))),
        }
    }
}

/// Parse a `YYYY-MM` month into the UTC instant it starts at
fn parse_month(input: &str) -> AppResult<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(&format!("{}-01", input), "%Y-%m-%d")
        .map_err(|_| AppError::Validation(format!("invalid month: {}", input)))?;
    Ok(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0).unwrap()))
}

#[derive(Clone)]
pub struct ReportsService {
    repository: Repository,
}

impl ReportsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn book_summary(&self) -> AppResult<BookSummary> {
        let total = self.repository.books.total_copies().await?;
        let borrowed = self.repository.books.borrowed_copies().await?;
        let categories = self.repository.categories.count().await?;
        Ok(BookSummary {
            total_books: total,
            available_books: total - borrowed,
            borrowed_books: borrowed,
            category_count: categories,
        })
    }

    pub async fn book_stats(
        &self,
        dimension: StatsDimension,
        start_year: Option<i32>,
        end_year: Option<i32>,
    ) -> AppResult<Vec<ChartPoint>> {
        match dimension {
            StatsDimension::Category => {
                let categories = self.repository.categories.get_all().await?;
                let names: HashMap<i32, String> =
                    categories.into_iter().map(|c| (c.id, c.name)).collect();
                let rows = self.repository.books.copies_by_category().await?;
                Ok(rows
                    .into_iter()
                    .map(|(id, count)| ChartPoint {
                        name: names
                            .get(&id)
                            .cloned()
                            .unwrap_or_else(|| format!("category {}", id)),
                        count,
                    })
                    .collect())
            }
            StatsDimension::Status => {
                let rows = self.repository.books.copies_by_status().await?;
                Ok(rows
                    .into_iter()
                    .map(|(status, count)| ChartPoint {
                        name: match status {
                            1 => "active".to_string(),
                            2 => "withdrawn".to_string(),
                            other => format!("status {}", other),
                        },
                        count,
                    })
                    .collect())
            }
            StatsDimension::Year => {
                let rows = self
                    .repository
                    .books
                    .copies_by_year(start_year, end_year)
                    .await?;
                Ok(rows
                    .into_iter()
                    .map(|(year, count)| ChartPoint {
                        name: year.to_string(),
                        count,
                    })
                    .collect())
            }
        }
    }

    /// Borrows per month between two `YYYY-MM` bounds (defaults to the last
    /// twelve months)
    pub async fn borrow_trend(
        &self,
        start: Option<&str>,
        end: Option<&str>,
    ) -> AppResult<Vec<ChartPoint>> {
        let end = match end {
            Some(raw) => parse_month(raw)? + Duration::days(31),
            None => Utc::now(),
        };
        let start = match start {
            Some(raw) => parse_month(raw)?,
            None => end - Duration::days(365),
        };
        if start >= end {
            return Err(AppError::Validation(
                "the start month must precede the end month".to_string(),
            ));
        }

        let rows = self
            .repository
            .borrows
            .borrow_counts_by_month(start, end)
            .await?;
        Ok(rows
            .into_iter()
            .map(|(month, count)| ChartPoint { name: month, count })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimension_parse_accepts_known_values() {
        assert_eq!(
            StatsDimension::parse("category").unwrap(),
            StatsDimension::Category
        );
        assert_eq!(StatsDimension::parse("year").unwrap(), StatsDimension::Year);
    }

    #[test]
    fn dimension_parse_rejects_unknown_values() {
        assert!(StatsDimension::parse("publisher").is_err());
    }

    #[test]
    fn month_parse_round_trips() {
        let parsed = parse_month("2025-06").unwrap();
        assert_eq!(parsed.format("%Y-%m-%d").to_string(), "2025-06-01");
    }

    #[test]
    fn month_parse_rejects_garbage() {
        assert!(parse_month("06-2025").is_err());
        assert!(parse_month("2025-13").is_err());
    }
}
