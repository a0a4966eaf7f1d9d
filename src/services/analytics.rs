//! Read-only reporting over items and the stock history trail.
//!
//! Rows are fetched with plain filtered queries and folded in Rust, so every report behaves
//! the same on SQLite and Postgres.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use sea_orm::DatabaseConnection;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::{
    dto::analytics::{
        FinancialSummary, ItemUpdateFrequency, LowStockItem, MonthlyStockMovement,
        PriceTrendPoint, StockPerSupplier, StockUpdateFilter, StockUpdateRow, StockValuePoint,
    },
    entities::{stock_history, StockChangeReason},
    errors::ServiceError,
    repositories::{InventoryItemRepository, StockHistoryRepository, SupplierRepository},
    services::stock_history::{non_blank, StockHistoryService},
};

const DEFAULT_WINDOW_DAYS: i64 = 30;
const WAC_SCALE: u32 = 4;

#[derive(Clone)]
pub struct AnalyticsService {
    db: Arc<DatabaseConnection>,
    history: StockHistoryService,
}

impl AnalyticsService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            history: StockHistoryService::new(db.clone()),
            db,
        }
    }

    /// Total stock valuation per day inside the window.
    #[instrument(skip(self))]
    pub async fn stock_value_over_time(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        supplier_id: Option<String>,
    ) -> Result<Vec<StockValuePoint>, ServiceError> {
        let (from, to) = date_window(start, end, Utc::now().date_naive())?;
        let supplier_id = non_blank(supplier_id);
        let events = StockHistoryRepository::find_in_window(
            self.db.as_ref(),
            from,
            to,
            supplier_id.as_deref(),
        )
        .await?;
        let prices: HashMap<String, Decimal> = InventoryItemRepository::find_all(self.db.as_ref())
            .await?
            .into_iter()
            .map(|item| (item.id, item.price))
            .collect();

        debug!(events = events.len(), "valuing stock history");
        Ok(daily_stock_value(&events, &prices))
    }

    #[instrument(skip(self))]
    pub async fn stock_per_supplier(&self) -> Result<Vec<StockPerSupplier>, ServiceError> {
        let rows = InventoryItemRepository::find_all_with_supplier(self.db.as_ref()).await?;

        let mut totals: HashMap<String, i64> = HashMap::new();
        for (item, supplier) in rows {
            if let Some(supplier) = supplier {
                *totals.entry(supplier.name).or_default() += i64::from(item.quantity);
            }
        }
        let mut result: Vec<StockPerSupplier> = totals
            .into_iter()
            .map(|(supplier_name, total_quantity)| StockPerSupplier {
                supplier_name,
                total_quantity,
            })
            .collect();
        result.sort_by(|a, b| {
            b.total_quantity
                .cmp(&a.total_quantity)
                .then_with(|| a.supplier_name.cmp(&b.supplier_name))
        });
        Ok(result)
    }

    /// How often each of the supplier's items appears in the history trail.
    #[instrument(skip(self))]
    pub async fn item_update_frequency(
        &self,
        supplier_id: Option<String>,
    ) -> Result<Vec<ItemUpdateFrequency>, ServiceError> {
        let supplier_id = require_non_blank(supplier_id, "supplierId")?;
        let rows =
            StockHistoryRepository::find_with_items(self.db.as_ref(), None, None, Some(&supplier_id))
                .await?;

        let mut counts: HashMap<String, i64> = HashMap::new();
        for (_, item) in rows {
            *counts.entry(item.name).or_default() += 1;
        }
        let mut result: Vec<ItemUpdateFrequency> = counts
            .into_iter()
            .map(|(item_name, update_count)| ItemUpdateFrequency {
                item_name,
                update_count,
            })
            .collect();
        result.sort_by(|a, b| {
            b.update_count
                .cmp(&a.update_count)
                .then_with(|| a.item_name.cmp(&b.item_name))
        });
        Ok(result)
    }

    #[instrument(skip(self))]
    pub async fn low_stock_items(
        &self,
        supplier_id: Option<String>,
    ) -> Result<Vec<LowStockItem>, ServiceError> {
        let supplier_id = require_non_blank(supplier_id, "supplierId")?;
        let items =
            InventoryItemRepository::find_below_minimum_stock(self.db.as_ref(), Some(&supplier_id))
                .await?;
        Ok(items
            .into_iter()
            .map(|item| LowStockItem {
                item_name: item.name,
                quantity: item.quantity,
                minimum_quantity: item.minimum_quantity,
            })
            .collect())
    }

    #[instrument(skip(self))]
    pub async fn low_stock_count(&self) -> Result<u64, ServiceError> {
        Ok(InventoryItemRepository::count_below_minimum_stock(self.db.as_ref()).await?)
    }

    #[instrument(skip(self))]
    pub async fn monthly_stock_movement(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        supplier_id: Option<String>,
    ) -> Result<Vec<MonthlyStockMovement>, ServiceError> {
        let (from, to) = date_window(start, end, Utc::now().date_naive())?;
        let supplier_id = non_blank(supplier_id);
        let events = StockHistoryRepository::find_in_window(
            self.db.as_ref(),
            from,
            to,
            supplier_id.as_deref(),
        )
        .await?;
        Ok(monthly_movement(&events))
    }

    /// History rows joined to item and supplier names, newest first.
    #[instrument(skip(self))]
    pub async fn filtered_stock_updates(
        &self,
        filter: StockUpdateFilter,
    ) -> Result<Vec<StockUpdateRow>, ServiceError> {
        let (start, end) = resolve_update_window(&filter, Utc::now())?;
        if let (Some(min), Some(max)) = (filter.min_change, filter.max_change) {
            if min > max {
                return Err(ServiceError::InvalidRequest(
                    "minChange must be <= maxChange".to_string(),
                ));
            }
        }
        let item_name = non_blank(filter.item_name).map(|n| n.to_lowercase());
        let created_by = non_blank(filter.created_by);
        let supplier_id = non_blank(filter.supplier_id);

        let supplier_names: HashMap<String, String> =
            SupplierRepository::find_all(self.db.as_ref())
                .await?
                .into_iter()
                .map(|s| (s.id, s.name))
                .collect();
        let rows = StockHistoryRepository::find_with_items(
            self.db.as_ref(),
            Some(start),
            Some(end),
            supplier_id.as_deref(),
        )
        .await?;

        Ok(rows
            .into_iter()
            .filter(|(entry, item)| {
                item_name
                    .as_deref()
                    .map_or(true, |needle| item.name.to_lowercase().contains(needle))
                    && created_by
                        .as_deref()
                        .map_or(true, |who| entry.created_by.eq_ignore_ascii_case(who))
                    && filter.min_change.map_or(true, |min| entry.quantity_change >= min)
                    && filter.max_change.map_or(true, |max| entry.quantity_change <= max)
            })
            .filter_map(|(entry, item)| {
                let supplier_name = supplier_names.get(&item.supplier_id)?.clone();
                Some(StockUpdateRow {
                    item_name: item.name,
                    supplier_name,
                    quantity_change: entry.quantity_change,
                    reason: entry.reason.to_string(),
                    created_by: entry.created_by,
                    timestamp: entry.created_at,
                })
            })
            .collect())
    }

    /// Average recorded price per day for one item.
    #[instrument(skip(self))]
    pub async fn price_trend(
        &self,
        item_id: Option<String>,
        supplier_id: Option<String>,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<PriceTrendPoint>, ServiceError> {
        let item_id = require_non_blank(item_id, "itemId")?;
        let (from, to) = date_window(start, end, Utc::now().date_naive())?;
        let supplier_id = non_blank(supplier_id);
        let points = self
            .history
            .price_trend(&item_id, supplier_id.as_deref(), from, to)
            .await?;
        Ok(daily_average_price(&points))
    }

    /// Opening, movement and ending valuation for `from..=to` under weighted average cost.
    /// The whole trail up to `to` is replayed so the opening position is exact.
    #[instrument(skip(self))]
    pub async fn financial_summary(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        supplier_id: Option<String>,
    ) -> Result<FinancialSummary, ServiceError> {
        let (Some(from), Some(to)) = (from, to) else {
            return Err(ServiceError::InvalidRequest(
                "from and to must be provided".to_string(),
            ));
        };
        if from > to {
            return Err(ServiceError::InvalidRequest(
                "from must be on or before to".to_string(),
            ));
        }
        let (_, end) = date_window(Some(from), Some(to), to)?;
        let supplier_id = non_blank(supplier_id);
        let events =
            StockHistoryRepository::find_until(self.db.as_ref(), end, supplier_id.as_deref())
                .await?;

        debug!(events = events.len(), "replaying trail at weighted average cost");
        Ok(weighted_average_summary(&events, from, to))
    }
}

/// Resolves an inclusive day window into instants. Defaults to the last 30 days up to `today`.
pub(crate) fn date_window(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    today: NaiveDate,
) -> Result<(DateTime<Utc>, DateTime<Utc>), ServiceError> {
    let end = end.unwrap_or(today);
    let start = start.unwrap_or(today - Duration::days(DEFAULT_WINDOW_DAYS));
    if start > end {
        return Err(ServiceError::InvalidRequest(
            "start must be on or before end".to_string(),
        ));
    }
    let from = start.and_hms_opt(0, 0, 0);
    let to = end.and_hms_nano_opt(23, 59, 59, 999_999_999);
    match (from, to) {
        (Some(from), Some(to)) => Ok((from.and_utc(), to.and_utc())),
        _ => Err(ServiceError::InternalError("unrepresentable date window".to_string())),
    }
}

fn resolve_update_window(
    filter: &StockUpdateFilter,
    now: DateTime<Utc>,
) -> Result<(DateTime<Utc>, DateTime<Utc>), ServiceError> {
    let end = filter.end_date.unwrap_or(now);
    let start = filter
        .start_date
        .unwrap_or(end - Duration::days(DEFAULT_WINDOW_DAYS));
    if start > end {
        return Err(ServiceError::InvalidRequest(
            "startDate must be on or before endDate".to_string(),
        ));
    }
    Ok((start, end))
}

fn require_non_blank(value: Option<String>, name: &str) -> Result<String, ServiceError> {
    non_blank(value).ok_or_else(|| ServiceError::InvalidRequest(format!("{} must not be blank", name)))
}

/// Folds events (oldest first) into a per-day valuation. Each item contributes its running
/// quantity after its last event that day, priced at that event's price, else the item's
/// current price, else zero.
pub(crate) fn daily_stock_value(
    events: &[stock_history::Model],
    item_prices: &HashMap<String, Decimal>,
) -> Vec<StockValuePoint> {
    let mut running: HashMap<&str, i64> = HashMap::new();
    let mut per_day: BTreeMap<NaiveDate, HashMap<&str, (i64, Decimal)>> = BTreeMap::new();

    for event in events {
        let quantity = running.entry(event.item_id.as_str()).or_default();
        *quantity += i64::from(event.quantity_change);
        let price = event
            .price_at_change
            .or_else(|| item_prices.get(&event.item_id).copied())
            .unwrap_or_default();
        per_day
            .entry(event.created_at.date_naive())
            .or_default()
            .insert(event.item_id.as_str(), (*quantity, price));
    }

    per_day
        .into_iter()
        .map(|(date, items)| StockValuePoint {
            date,
            total_value: items
                .values()
                .map(|(quantity, price)| Decimal::from(*quantity) * price)
                .sum(),
        })
        .collect()
}

/// Running position of one item: units on hand and their average unit cost.
#[derive(Debug, Clone, Copy, Default)]
struct WacPosition {
    quantity: i64,
    average_cost: Decimal,
}

impl WacPosition {
    fn receive(&mut self, quantity: i64, unit_cost: Decimal) {
        let total = self.quantity + quantity;
        self.average_cost = if total == 0 {
            Decimal::ZERO
        } else {
            ((self.value() + unit_cost * Decimal::from(quantity)) / Decimal::from(total))
                .round_dp_with_strategy(WAC_SCALE, RoundingStrategy::MidpointAwayFromZero)
        };
        self.quantity = total;
    }

    /// Takes units out at the current average and returns their cost. Never goes below zero.
    fn issue(&mut self, quantity: i64) -> Decimal {
        self.quantity = (self.quantity - quantity).max(0);
        self.average_cost * Decimal::from(quantity)
    }

    fn value(&self) -> Decimal {
        self.average_cost * Decimal::from(self.quantity)
    }
}

fn is_write_off(reason: StockChangeReason) -> bool {
    matches!(
        reason,
        StockChangeReason::Damaged
            | StockChangeReason::Destroyed
            | StockChangeReason::Scrapped
            | StockChangeReason::Expired
            | StockChangeReason::Lost
    )
}

fn totals(positions: &HashMap<&str, WacPosition>) -> (i64, Decimal) {
    positions
        .values()
        .fold((0, Decimal::ZERO), |(qty, value), p| (qty + p.quantity, value + p.value()))
}

/// Replays events (oldest first, none after `to`) into a period summary.
///
/// Inbound units are costed at the event price, else the running average. Customer returns
/// are reported apart from purchases; unpriced inbound adjustments other than initial stock
/// move the average but are not counted as purchases. Outbound units leave at the running
/// average: returns to supplier reduce purchases, loss reasons are write-offs, anything else
/// is cost of goods sold.
pub(crate) fn weighted_average_summary(
    events: &[stock_history::Model],
    from: NaiveDate,
    to: NaiveDate,
) -> FinancialSummary {
    let mut positions: HashMap<&str, WacPosition> = HashMap::new();
    let (opening, in_period): (Vec<_>, Vec<_>) = events
        .iter()
        .partition(|e| e.created_at.date_naive() < from);

    for event in opening {
        let position = positions.entry(event.item_id.as_str()).or_default();
        let change = i64::from(event.quantity_change);
        if change > 0 {
            let unit = event.price_at_change.unwrap_or(position.average_cost);
            position.receive(change, unit);
        } else if change < 0 {
            position.issue(-change);
        }
    }
    let (opening_qty, opening_value) = totals(&positions);

    let mut summary = FinancialSummary {
        method: "WAC".to_string(),
        from_date: from,
        to_date: to,
        opening_qty,
        opening_value,
        purchases_qty: 0,
        purchases_cost: Decimal::ZERO,
        returns_in_qty: 0,
        returns_in_cost: Decimal::ZERO,
        cogs_qty: 0,
        cogs_cost: Decimal::ZERO,
        write_off_qty: 0,
        write_off_cost: Decimal::ZERO,
        ending_qty: 0,
        ending_value: Decimal::ZERO,
    };

    for event in in_period {
        let position = positions.entry(event.item_id.as_str()).or_default();
        let change = i64::from(event.quantity_change);
        if change > 0 {
            let unit = event.price_at_change.unwrap_or(position.average_cost);
            position.receive(change, unit);
            let cost = unit * Decimal::from(change);
            if event.reason == StockChangeReason::ReturnedByCustomer {
                summary.returns_in_qty += change;
                summary.returns_in_cost += cost;
            } else if event.price_at_change.is_some()
                || event.reason == StockChangeReason::InitialStock
            {
                summary.purchases_qty += change;
                summary.purchases_cost += cost;
            }
        } else if change < 0 {
            let units = -change;
            let cost = position.issue(units);
            if event.reason == StockChangeReason::ReturnedToSupplier {
                summary.purchases_qty -= units;
                summary.purchases_cost -= cost;
            } else if is_write_off(event.reason) {
                summary.write_off_qty += units;
                summary.write_off_cost += cost;
            } else {
                summary.cogs_qty += units;
                summary.cogs_cost += cost;
            }
        }
    }

    let (ending_qty, ending_value) = totals(&positions);
    summary.ending_qty = ending_qty;
    summary.ending_value = ending_value;
    summary
}

pub(crate) fn monthly_movement(events: &[stock_history::Model]) -> Vec<MonthlyStockMovement> {
    let mut months: BTreeMap<String, (i64, i64)> = BTreeMap::new();
    for event in events {
        let change = i64::from(event.quantity_change);
        let entry = months
            .entry(event.created_at.format("%Y-%m").to_string())
            .or_default();
        if change > 0 {
            entry.0 += change;
        } else {
            entry.1 += -change;
        }
    }
    months
        .into_iter()
        .map(|(month, (stock_in, stock_out))| MonthlyStockMovement {
            month,
            stock_in,
            stock_out,
        })
        .collect()
}

pub(crate) fn daily_average_price(points: &[(DateTime<Utc>, Decimal)]) -> Vec<PriceTrendPoint> {
    let mut days: BTreeMap<String, (Decimal, u32)> = BTreeMap::new();
    for (at, price) in points {
        let entry = days.entry(at.format("%Y-%m-%d").to_string()).or_default();
        entry.0 += price;
        entry.1 += 1;
    }
    days.into_iter()
        .map(|(timestamp, (sum, count))| PriceTrendPoint {
            timestamp,
            price: (sum / Decimal::from(count)).round_dp(2),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::StockChangeReason;
    use assert_matches::assert_matches;
    use chrono::TimeZone;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn event(item: &str, change: i32, price: Option<Decimal>, at: DateTime<Utc>) -> stock_history::Model {
        stock_history::Model {
            id: format!("{}-{}", item, at.timestamp_nanos_opt().unwrap_or_default()),
            item_id: item.into(),
            supplier_id: Some("sup".into()),
            quantity_change: change,
            reason: StockChangeReason::ManualUpdate,
            price_at_change: price,
            created_by: "tester".into(),
            created_at: at,
        }
    }

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).unwrap()
    }

    fn movement(
        item: &str,
        change: i32,
        price: Option<Decimal>,
        reason: StockChangeReason,
        at: DateTime<Utc>,
    ) -> stock_history::Model {
        stock_history::Model {
            reason,
            ..event(item, change, price, at)
        }
    }

    fn march(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    #[test]
    fn window_defaults_to_last_thirty_days() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        let (from, to) = date_window(None, None, today).unwrap();
        assert_eq!(from, Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());
        assert_eq!(to.date_naive(), today);
    }

    #[test]
    fn inverted_window_is_rejected() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        let start = NaiveDate::from_ymd_opt(2024, 3, 10);
        let end = NaiveDate::from_ymd_opt(2024, 3, 9);
        assert_matches!(
            date_window(start, end, today),
            Err(ServiceError::InvalidRequest(msg)) if msg == "start must be on or before end"
        );
    }

    #[test]
    fn stock_value_uses_last_event_per_item_and_day() {
        let events = vec![
            event("a", 10, Some(dec!(2.5)), at(1, 9)),
            event("a", -4, Some(dec!(2.5)), at(1, 15)),
            event("b", 3, None, at(1, 12)),
            event("a", 2, Some(dec!(3)), at(2, 8)),
        ];
        let prices = HashMap::from([("b".to_string(), dec!(1.25))]);

        let points = daily_stock_value(&events, &prices);
        assert_eq!(points.len(), 2);
        // day one: a = 6 * 2.5, b = 3 * 1.25
        assert_eq!(points[0].total_value, dec!(18.75));
        // day two only sees item a, now at 8 units
        assert_eq!(points[1].total_value, dec!(24));
    }

    #[test]
    fn unknown_price_values_at_zero() {
        let events = vec![event("ghost", 5, None, at(3, 10))];
        let points = daily_stock_value(&events, &HashMap::new());
        assert_eq!(points[0].total_value, Decimal::ZERO);
    }

    #[test]
    fn monthly_movement_splits_in_and_out() {
        let events = vec![
            event("a", 10, None, at(1, 9)),
            event("a", -3, None, at(5, 9)),
            event("b", 0, None, at(6, 9)),
            event(
                "a",
                4,
                None,
                Utc.with_ymd_and_hms(2024, 4, 2, 9, 0, 0).unwrap(),
            ),
        ];
        let months = monthly_movement(&events);
        assert_eq!(
            months,
            vec![
                MonthlyStockMovement {
                    month: "2024-03".into(),
                    stock_in: 10,
                    stock_out: 3
                },
                MonthlyStockMovement {
                    month: "2024-04".into(),
                    stock_in: 4,
                    stock_out: 0
                },
            ]
        );
    }

    #[test]
    fn price_trend_averages_per_day() {
        let points = vec![
            (at(1, 9), dec!(2.00)),
            (at(1, 18), dec!(3.00)),
            (at(2, 9), dec!(4.50)),
        ];
        let trend = daily_average_price(&points);
        assert_eq!(trend.len(), 2);
        assert_eq!(trend[0].timestamp, "2024-03-01");
        assert_eq!(trend[0].price, dec!(2.50));
        assert_eq!(trend[1].price, dec!(4.50));
    }

    #[test]
    fn update_window_validates_order() {
        let now = at(20, 0);
        let filter = StockUpdateFilter {
            start_date: Some(at(10, 0)),
            end_date: Some(at(5, 0)),
            ..Default::default()
        };
        assert_matches!(
            resolve_update_window(&filter, now),
            Err(ServiceError::InvalidRequest(msg)) if msg == "startDate must be on or before endDate"
        );

        let (start, end) = resolve_update_window(&StockUpdateFilter::default(), now).unwrap();
        assert_eq!(end, now);
        assert_eq!(end - start, Duration::days(30));
    }

    #[test]
    fn weighted_average_summary_reconciles_the_period() {
        use StockChangeReason::*;
        let events = vec![
            movement("a", 10, Some(dec!(2)), InitialStock, at(1, 9)),
            movement("a", -4, Some(dec!(2)), Sold, at(5, 9)),
            movement("a", 6, Some(dec!(3)), ManualUpdate, at(12, 9)),
            movement("a", -2, Some(dec!(3)), Sold, at(13, 9)),
            movement("a", -1, Some(dec!(3)), Damaged, at(14, 9)),
            movement("a", 1, Some(dec!(2.5)), ReturnedByCustomer, at(15, 9)),
            movement("a", -3, Some(dec!(3)), ReturnedToSupplier, at(16, 9)),
            movement("a", 0, Some(dec!(4)), PriceChange, at(17, 9)),
        ];

        let summary = weighted_average_summary(&events, march(10), march(20));
        assert_eq!(summary.method, "WAC");
        assert_eq!((summary.opening_qty, summary.opening_value), (6, dec!(12)));
        // 6 bought at 3, then 3 sent back at the 2.5 average
        assert_eq!((summary.purchases_qty, summary.purchases_cost), (3, dec!(10.5)));
        assert_eq!((summary.returns_in_qty, summary.returns_in_cost), (1, dec!(2.5)));
        assert_eq!((summary.cogs_qty, summary.cogs_cost), (2, dec!(5)));
        assert_eq!((summary.write_off_qty, summary.write_off_cost), (1, dec!(2.5)));
        assert_eq!((summary.ending_qty, summary.ending_value), (7, dec!(17.5)));
        assert_eq!(
            summary.opening_value + summary.purchases_cost + summary.returns_in_cost
                - summary.cogs_cost
                - summary.write_off_cost,
            summary.ending_value
        );
    }

    #[rstest]
    #[case::sale(StockChangeReason::Sold, (2, 0, 0))]
    #[case::unclassified_outflow(StockChangeReason::ManualUpdate, (2, 0, 0))]
    #[case::lost(StockChangeReason::Lost, (0, 2, 0))]
    #[case::expired(StockChangeReason::Expired, (0, 2, 0))]
    #[case::back_to_supplier(StockChangeReason::ReturnedToSupplier, (0, 0, -2))]
    fn outbound_reasons_land_in_their_bucket(
        #[case] reason: StockChangeReason,
        #[case] expected: (i64, i64, i64),
    ) {
        let events = vec![
            movement("a", 10, Some(dec!(2)), StockChangeReason::InitialStock, at(1, 9)),
            movement("a", -2, Some(dec!(2)), reason, at(12, 9)),
        ];
        let summary = weighted_average_summary(&events, march(10), march(20));
        assert_eq!(
            (summary.cogs_qty, summary.write_off_qty, summary.purchases_qty),
            expected
        );
        assert_eq!((summary.ending_qty, summary.ending_value), (8, dec!(16)));
    }

    #[rstest]
    #[case::priced(Some(dec!(4)), StockChangeReason::ManualUpdate, (5, dec!(20)), dec!(3))]
    #[case::unpriced_adjustment(None, StockChangeReason::ManualUpdate, (0, dec!(0)), dec!(2))]
    #[case::unpriced_initial_stock(None, StockChangeReason::InitialStock, (5, dec!(10)), dec!(2))]
    fn inbound_cost_falls_back_to_running_average(
        #[case] price: Option<Decimal>,
        #[case] reason: StockChangeReason,
        #[case] purchases: (i64, Decimal),
        #[case] average: Decimal,
    ) {
        let events = vec![
            movement("a", 5, Some(dec!(2)), StockChangeReason::InitialStock, at(1, 9)),
            movement("a", 5, price, reason, at(12, 9)),
        ];
        let summary = weighted_average_summary(&events, march(10), march(20));
        assert_eq!((summary.purchases_qty, summary.purchases_cost), purchases);
        assert_eq!(summary.ending_value, average * Decimal::from(10));
    }

    #[test]
    fn running_average_is_rounded_to_four_places() {
        let events = vec![
            movement("a", 1, Some(dec!(1)), StockChangeReason::InitialStock, at(1, 9)),
            movement("a", 2, Some(dec!(2)), StockChangeReason::ManualUpdate, at(2, 9)),
        ];
        let summary = weighted_average_summary(&events, march(10), march(20));
        // (1 + 4) / 3 = 1.6667
        assert_eq!(summary.opening_value, dec!(1.6667) * Decimal::from(3));
    }

    #[test]
    fn overselling_never_leaves_a_negative_position() {
        let events = vec![
            movement("a", 2, Some(dec!(5)), StockChangeReason::InitialStock, at(11, 9)),
            movement("a", -3, Some(dec!(5)), StockChangeReason::Sold, at(12, 9)),
            movement("b", -1, None, StockChangeReason::Lost, at(12, 10)),
        ];
        let summary = weighted_average_summary(&events, march(10), march(20));
        assert_eq!(summary.opening_qty, 0);
        assert_eq!((summary.cogs_qty, summary.cogs_cost), (3, dec!(15)));
        assert_eq!((summary.write_off_qty, summary.write_off_cost), (1, dec!(0)));
        assert_eq!((summary.ending_qty, summary.ending_value), (0, dec!(0)));
    }
}
