//! Weekly timetable grid.
//!
//! Turns a flat list of lessons into the nested structure the page renders:
//! day → absolute slot row → class-group column → list of lesson cells. Full-pair
//! lessons are written into both of their slots; the first carries `row_span = 2`
//! and the second is marked `skip_render` so an HTML table can merge the two rows.

use crate::lesson::{ClassGroup, Day, Lesson, PairNumber, Subject, SubGroup, Week, pair_label};
use crate::lesson_times::LessonTimes;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonCell {
    pub lesson_id: u32,
    pub subject: Subject,
    pub cabinet: String,
    pub sub_group: SubGroup,
    pub row_span: u8,
    /// Second half of a full pair; the renderer omits it and relies on the
    /// previous row's `row_span`.
    pub skip_render: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotRow {
    pub time: String,
    pub pair_label: String,
    pub show_pair_label: bool,
    /// Rows of this day sharing `pair_label`, set on every row of the group.
    pub pair_row_span: usize,
    pub cells: BTreeMap<u32, Vec<LessonCell>>,
}

impl SlotRow {
    pub fn cells_for(&self, class_group_id: u32) -> &[LessonCell] {
        self.cells
            .get(&class_group_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySchedule {
    pub day: Day,
    pub label: String,
    pub rows: BTreeMap<u8, SlotRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleGrid {
    /// Selected rotation week, `None` when the request named an invalid one.
    pub week: Option<Week>,
    /// Column order for rendering.
    pub class_groups: Vec<ClassGroup>,
    /// Only days with at least one lesson in the selected week.
    pub days: BTreeMap<Day, DaySchedule>,
}

impl ScheduleGrid {
    pub fn day(&self, day: Day) -> Option<&DaySchedule> {
        self.days.get(&day)
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

pub struct ScheduleGridBuilder<'a> {
    times: &'a LessonTimes,
}

impl<'a> ScheduleGridBuilder<'a> {
    pub fn new(times: &'a LessonTimes) -> Self {
        Self { times }
    }

    /// Builds the grid for `week`. Week numbers outside the rotation produce an empty
    /// grid. `class_groups` only labels the columns; lessons of groups missing from it
    /// are still placed.
    pub fn build<'l, I>(&self, lessons: I, week: u32, class_groups: &[ClassGroup]) -> ScheduleGrid
    where
        I: IntoIterator<Item = &'l Lesson>,
    {
        let week = u8::try_from(week).ok().and_then(|w| Week::try_from(w).ok());
        let mut grid = ScheduleGrid {
            week,
            class_groups: class_groups.to_vec(),
            days: BTreeMap::new(),
        };
        let Some(week) = week else {
            tracing::debug!("week outside rotation, returning empty grid");
            return grid;
        };

        let mut selected: Vec<&Lesson> = lessons.into_iter().filter(|l| l.week == week).collect();
        selected.sort_by_key(|l| (l.day, l.pair, l.part, l.class_group_id, l.sub_group, l.id));

        let mut by_day: BTreeMap<Day, Vec<&Lesson>> = BTreeMap::new();
        for lesson in selected {
            by_day.entry(lesson.day).or_default().push(lesson);
        }

        for (day, day_lessons) in by_day {
            let rows = self.build_day(&day_lessons);
            grid.days.insert(
                day,
                DaySchedule {
                    day,
                    label: day.label().to_string(),
                    rows,
                },
            );
        }

        tracing::debug!(
            week = week.number(),
            days = grid.days.len(),
            "built schedule grid"
        );
        grid
    }

    fn build_day(&self, lessons: &[&Lesson]) -> BTreeMap<u8, SlotRow> {
        let mut rows: BTreeMap<u8, SlotRow> = BTreeMap::new();

        for lesson in lessons {
            let slots = lesson.slots();
            let spans_pair = slots.len() == 2;
            for (idx, slot) in slots.into_iter().enumerate() {
                let row = rows.entry(slot).or_insert_with(|| SlotRow {
                    time: self.times.slot(slot).to_string(),
                    pair_label: pair_label(slot).unwrap_or_default().to_string(),
                    show_pair_label: false,
                    pair_row_span: 0,
                    cells: BTreeMap::new(),
                });
                row.cells
                    .entry(lesson.class_group_id)
                    .or_default()
                    .push(LessonCell {
                        lesson_id: lesson.id,
                        subject: lesson.subject.clone(),
                        cabinet: lesson.cabinet.clone(),
                        sub_group: lesson.sub_group,
                        row_span: if spans_pair && idx == 0 { 2 } else { 1 },
                        skip_render: spans_pair && idx == 1,
                    });
            }
        }

        let mut span_by_pair: HashMap<Option<PairNumber>, usize> = HashMap::new();
        for slot in rows.keys() {
            *span_by_pair
                .entry(PairNumber::containing_slot(*slot))
                .or_default() += 1;
        }

        let mut last_pair = None;
        for (slot, row) in rows.iter_mut() {
            let pair = PairNumber::containing_slot(*slot);
            row.show_pair_label = last_pair != Some(pair);
            row.pair_row_span = span_by_pair.get(&pair).copied().unwrap_or(1);
            last_pair = Some(pair);
        }

        rows
    }
}
