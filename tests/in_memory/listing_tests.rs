//! Listing, pagination and today-window tests.

use super::helpers::{Agency, runtime};
use carevisit::schedule::domain::{
    ScheduleFilters, ScheduleId, ScheduleSortField, SortDirection,
};
use chrono::{Duration, Utc};
use eyre::ensure;
use rstest::rstest;
use std::io;
use tokio::runtime::Runtime;

#[rstest]
#[case(SortDirection::Asc)]
#[case(SortDirection::Desc)]
fn pages_cover_every_visit_in_order(
    runtime: io::Result<Runtime>,
    #[case] direction: SortDirection,
) -> eyre::Result<()> {
    let rt = runtime?;
    rt.block_on(async {
        let agency = Agency::new().await?;
        let base = Utc::now();
        let mut expected = Vec::new();
        for offset in 0..25 {
            let visit = agency.create_at(base + Duration::hours(offset)).await?;
            expected.push(visit.id());
        }
        if direction == SortDirection::Desc {
            expected.reverse();
        }

        let mut seen: Vec<ScheduleId> = Vec::new();
        let mut page_number = 1;
        loop {
            let filters = ScheduleFilters::new()
                .with_sort([ScheduleSortField::ScheduledSlotFrom], direction)
                .with_page(page_number)
                .with_page_size(10);
            let page = agency
                .service
                .get_schedules_by_assignee(agency.caregiver, &filters)
                .await?;
            ensure!(page.total == 25);
            ensure!(page.total_pages == 3);
            seen.extend(page.data.iter().map(|visit| visit.id()));
            if !page.has_next() {
                break;
            }
            page_number += 1;
        }

        ensure!(seen == expected);
        Ok(())
    })
}

#[rstest]
fn today_for_assignee_walks_past_the_largest_page(
    runtime: io::Result<Runtime>,
) -> eyre::Result<()> {
    let rt = runtime?;
    rt.block_on(async {
        let agency = Agency::new().await?;
        let now = Utc::now();
        let today_count: i64 = 105;
        for second in 0..today_count {
            agency.create_at(now + Duration::seconds(second)).await?;
        }
        agency.create_at(now + Duration::days(2)).await?;
        agency.create_at(now - Duration::days(2)).await?;

        let today = agency
            .service
            .get_today_schedules_by_assignee(agency.caregiver)
            .await?;
        ensure!(i64::try_from(today.len())? == today_count);
        ensure!(
            today
                .windows(2)
                .all(|pair| matches!(pair, [a, b] if a.scheduled_slot().starts_at() <= b.scheduled_slot().starts_at()))
        );

        let with_clients = agency
            .service
            .get_today_schedules_with_clients(agency.client)
            .await?;
        ensure!(i64::try_from(with_clients.schedules.len())? == today_count);
        ensure!(with_clients.clients.len() == 1);
        Ok(())
    })
}
