use chrono::NaiveDateTime;
use diesel::{connection::LoadConnection, prelude::*, sqlite::Sqlite};
use serde::Serialize;

use crate::{schema::team, state::StoreError};

/// A row of the `team` table.
#[derive(Queryable, Selectable, Serialize, Debug, Clone, PartialEq)]
#[diesel(table_name = team)]
#[diesel(check_for_backend(Sqlite))]
pub struct Team {
    pub id: i32,
    pub name: String,
    pub org_id: i64,
    #[diesel(column_name = created)]
    pub created_at: NaiveDateTime,
    #[diesel(column_name = updated)]
    pub updated_at: NaiveDateTime,
    pub email: String,
}

/// A team which has not been written yet. The id is assigned by the store.
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = team)]
pub struct NewTeam<'a> {
    pub name: &'a str,
    pub org_id: i64,
    #[diesel(column_name = created)]
    pub created_at: NaiveDateTime,
    #[diesel(column_name = updated)]
    pub updated_at: NaiveDateTime,
    pub email: &'a str,
}

impl<'a> NewTeam<'a> {
    /// Both timestamps are set to `now`, `org_id` is zero and `email` is
    /// empty.
    pub fn new(name: &'a str, now: NaiveDateTime) -> Self {
        Self {
            name,
            org_id: 0,
            created_at: now,
            updated_at: now,
            email: "",
        }
    }

    pub fn org_id(mut self, org_id: i64) -> Self {
        self.org_id = org_id;
        self
    }
}

/// A partial update. Only the fields which are `Some` are written; every
/// other column keeps its stored value.
#[derive(AsChangeset, Debug, Clone, Default)]
#[diesel(table_name = team)]
pub struct TeamChanges<'a> {
    pub name: Option<&'a str>,
    pub org_id: Option<i64>,
}

impl<'a> TeamChanges<'a> {
    pub fn name(mut self, name: &'a str) -> Self {
        self.name = Some(name);
        self
    }

    pub fn org_id(mut self, org_id: i64) -> Self {
        self.org_id = Some(org_id);
        self
    }
}

#[tracing::instrument(level = "trace", skip(conn))]
pub fn insert_team(
    conn: &mut impl LoadConnection<Backend = Sqlite>,
    new: &NewTeam<'_>,
) -> Result<(), StoreError> {
    diesel::insert_into(team::table)
        .values(new)
        .execute(&mut *conn)?;
    Ok(())
}

/// Fetches the first team with the given name. `Ok(None)` means no such
/// row exists; `Err` means the query itself failed.
#[tracing::instrument(level = "trace", skip(conn))]
pub fn get_team(
    conn: &mut impl LoadConnection<Backend = Sqlite>,
    name: &str,
) -> Result<Option<Team>, StoreError> {
    let ret = team::table
        .filter(team::name.eq(name))
        .select(Team::as_select())
        .first::<Team>(&mut *conn)
        .optional()?;

    tracing::trace!("found? {}", ret.is_some());

    Ok(ret)
}

/// Applies `changes` to the team with the given id, returning the number of
/// rows written (zero if the id does not exist).
#[tracing::instrument(level = "trace", skip(conn))]
pub fn update_team(
    conn: &mut impl LoadConnection<Backend = Sqlite>,
    id: i32,
    changes: &TeamChanges<'_>,
) -> Result<usize, StoreError> {
    let n = diesel::update(team::table.find(id))
        .set(changes)
        .execute(&mut *conn)?;
    Ok(n)
}

/// Deletes every team with the given name and returns the deleted ids.
#[tracing::instrument(level = "trace", skip(conn))]
pub fn delete_team(
    conn: &mut impl LoadConnection<Backend = Sqlite>,
    name: &str,
) -> Result<Vec<i32>, StoreError> {
    let ids = diesel::delete(team::table.filter(team::name.eq(name)))
        .returning(team::id)
        .get_results::<i32>(&mut *conn)?;
    Ok(ids)
}

#[tracing::instrument(level = "trace", skip(conn))]
pub fn count_teams(
    conn: &mut impl LoadConnection<Backend = Sqlite>,
) -> Result<i64, StoreError> {
    Ok(team::table.count().get_result::<i64>(&mut *conn)?)
}
