use chrono::Utc;
use diesel::prelude::*;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::order::{page_offset, NewOrder, Order, OrderPage, OrderStatus};
use crate::domain::ports::OrderRepository;
use crate::schema::orders;

use super::models::{NewOrderRow, OrderRow};

pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl OrderRepository for DieselOrderRepository {
    fn insert(&self, order: NewOrder) -> Result<Order, DomainError> {
        let mut conn = self.pool.get()?;

        let row: OrderRow = diesel::insert_into(orders::table)
            .values(&NewOrderRow::from(order))
            .returning(OrderRow::as_returning())
            .get_result(&mut conn)?;

        row.try_into()
    }

    fn find_by_number(&self, order_number: &str) -> Result<Option<Order>, DomainError> {
        let mut conn = self.pool.get()?;

        orders::table
            .filter(orders::order_number.eq(order_number))
            .select(OrderRow::as_select())
            .first::<OrderRow>(&mut conn)
            .optional()?
            .map(Order::try_from)
            .transpose()
    }

    fn list(&self, page: i64, limit: i64) -> Result<OrderPage, DomainError> {
        let mut conn = self.pool.get()?;

        let offset = page_offset(page, limit)?;
        conn.transaction::<_, DomainError, _>(|conn| {
            let total: i64 = orders::table.count().get_result(conn)?;

            let rows = orders::table
                .select(OrderRow::as_select())
                .order((orders::created_at.desc(), orders::id.desc()))
                .limit(limit)
                .offset(offset)
                .load::<OrderRow>(conn)?;

            Ok(OrderPage {
                items: rows
                    .into_iter()
                    .map(Order::try_from)
                    .collect::<Result<_, _>>()?,
                total,
            })
        })
    }

    fn update_status(
        &self,
        order_number: &str,
        status: OrderStatus,
    ) -> Result<Option<Order>, DomainError> {
        let mut conn = self.pool.get()?;

        diesel::update(orders::table.filter(orders::order_number.eq(order_number)))
            .set((
                orders::status.eq(status.as_str()),
                orders::updated_at.eq(Utc::now()),
            ))
            .returning(OrderRow::as_returning())
            .get_result::<OrderRow>(&mut conn)
            .optional()?
            .map(Order::try_from)
            .transpose()
    }
}
