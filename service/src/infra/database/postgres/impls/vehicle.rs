//! [`Vehicle`]-related [`Database`] implementations.

use common::operations::{By, Delete, Insert, Lock, Select, Update};
use itertools::Itertools as _;
use postgres_types::{Json, ToSql};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{
        vehicle::{
            stock_id::Prefix, Equipment, Features, Mileage, Status, StockId,
            Year,
        },
        Reservation, Vehicle,
    },
    infra::{
        database::{
            self,
            postgres::{self, Connection, PrefixPattern},
            Postgres,
        },
        Database,
    },
    read,
};

/// Columns of the `vehicles` table, in the order [`decode()`] expects them.
const COLUMNS: &str = "\
    stock_id, brand, model, version, sale_type, fuel_type, \
    year, mileage, price, discount, currency, \
    city, branch, transmission, drivetrain, warranty, \
    images, cover_image, imperfection_images, equipment, features, \
    featured, status, reservations, \
    revision, created_at, updated_at";

/// Decodes a [`Vehicle`] out of the provided `vehicles` table [`Row`].
fn decode(row: &Row) -> Result<Vehicle, Traced<database::Error>> {
    let malformed = |column| {
        tracerr::new!(database::Error::from(
            postgres::Error::MalformedColumn(column)
        ))
    };

    let year = Year::new(row.get::<_, i32>("year").into())
        .ok_or_else(|| malformed("year"))?;
    let mileage = Mileage::new(row.get("mileage"))
        .ok_or_else(|| malformed("mileage"))?;
    let equipment =
        Equipment::new(row.get::<_, Json<Vec<String>>>("equipment").0)
            .ok_or_else(|| malformed("equipment"))?;

    Ok(Vehicle {
        stock_id: row.get("stock_id"),
        brand: row.get("brand"),
        model: row.get("model"),
        version: row.get("version"),
        sale_type: row.get("sale_type"),
        fuel_type: row.get("fuel_type"),
        year,
        mileage,
        price: row.get("price"),
        discount: row.get("discount"),
        currency: row.get("currency"),
        city: row.get("city"),
        branch: row.get("branch"),
        transmission: row.get("transmission"),
        drivetrain: row.get("drivetrain"),
        warranty: row.get("warranty"),
        images: row.get::<_, Json<_>>("images").0,
        cover_image: row.get("cover_image"),
        imperfection_images: row.get::<_, Json<_>>("imperfection_images").0,
        equipment,
        features: row.get::<_, Json<_>>("features").0,
        featured: row.get("featured"),
        status: row.get::<_, Json<_>>("status").0,
        reservations: row.get::<_, Json<_>>("reservations").0,
        revision: row.get("revision"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

impl<C> Database<Select<By<Option<Vehicle>, StockId>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Vehicle>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Vehicle>, StockId>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let stock_id: StockId = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM vehicles \
             WHERE stock_id = $1::VARCHAR \
             LIMIT 1",
        );
        self.query_opt(sql.as_str(), &[&stock_id])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(decode)
            .transpose()
            .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Select<By<Option<StockId>, Prefix>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<StockId>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<StockId>, Prefix>>,
    ) -> Result<Self::Ok, Self::Err> {
        let pattern = PrefixPattern::new(&by.into_inner().to_string());

        // Longer sequence numbers are always greater ones.
        const SQL: &str = "\
            SELECT stock_id \
            FROM vehicles \
            WHERE stock_id LIKE $1::VARCHAR \
            ORDER BY LENGTH(stock_id) DESC, \
                     stock_id DESC \
            LIMIT 1";
        self.query_opt(SQL, &[&pattern])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.map(|r| r.get("stock_id")))
    }
}

impl<C> Database<Select<By<Vec<Vehicle>, read::vehicle::list::Selector>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Vehicle>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Vehicle>, read::vehicle::list::Selector>>,
    ) -> Result<Self::Ok, Self::Err> {
        use read::vehicle::list::{Field, Filter, Selector};

        let Selector {
            filter:
                Filter {
                    brand,
                    model,
                    fuel_type,
                    year,
                    mileage,
                    price,
                    featured_only,
                    discounted_only,
                },
            sorting,
        } = by.into_inner();

        let brand = brand.as_deref().map(PrefixPattern::new);
        let model = model.as_deref().map(PrefixPattern::new);
        let fuel_type = fuel_type.as_deref().map(PrefixPattern::new);
        let year = year.map(|y| i32::from(u16::from(y)));
        let (min_mileage, max_mileage) = mileage.map_or((None, None), |r| {
            let (min, max) = r.bounds();
            (
                min.map(|m| i64::from(u32::from(m))),
                max.map(|m| i64::from(u32::from(m))),
            )
        });
        let (min_price, max_price) =
            price.map_or((None, None), read::vehicle::list::Range::bounds);

        let mut ps: Vec<&(dyn ToSql + Sync)> = vec![];

        let brand_idx = brand.as_ref().map(|p| {
            ps.push(p);
            ps.len()
        });
        let model_idx = model.as_ref().map(|p| {
            ps.push(p);
            ps.len()
        });
        let fuel_type_idx = fuel_type.as_ref().map(|p| {
            ps.push(p);
            ps.len()
        });
        let year_idx = year.as_ref().map(|y| {
            ps.push(y);
            ps.len()
        });
        let min_mileage_idx = min_mileage.as_ref().map(|m| {
            ps.push(m);
            ps.len()
        });
        let max_mileage_idx = max_mileage.as_ref().map(|m| {
            ps.push(m);
            ps.len()
        });
        let min_price_idx = min_price.as_ref().map(|p| {
            ps.push(p);
            ps.len()
        });
        let max_price_idx = max_price.as_ref().map(|p| {
            ps.push(p);
            ps.len()
        });

        let prefix_filtering = |column: &'static str, idx: Option<usize>| {
            idx.into_iter().format_with("", move |idx, f| {
                f(&format_args!(
                    "AND LOWER({column}) LIKE LOWER(${idx}::VARCHAR) "
                ))
            })
        };
        let bound_filtering = |column: &'static str,
                               op: &'static str,
                               ty: &'static str,
                               idx: Option<usize>| {
            idx.into_iter().format_with("", move |idx, f| {
                f(&format_args!("AND {column} {op} ${idx}::{ty} "))
            })
        };

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM vehicles \
             WHERE true \
                   {brand_filtering}\
                   {model_filtering}\
                   {fuel_type_filtering}\
                   {year_filtering}\
                   {min_mileage_filtering}\
                   {max_mileage_filtering}\
                   {min_price_filtering}\
                   {max_price_filtering}\
                   {featured_filtering}\
                   {discounted_filtering}\
             ORDER BY {ordering} \
                      created_at ASC, \
                      stock_id ASC",
            brand_filtering = prefix_filtering("brand", brand_idx),
            model_filtering = prefix_filtering("model", model_idx),
            fuel_type_filtering = prefix_filtering("fuel_type", fuel_type_idx),
            year_filtering = bound_filtering("year", "=", "INT4", year_idx),
            min_mileage_filtering =
                bound_filtering("mileage", ">=", "INT8", min_mileage_idx),
            max_mileage_filtering =
                bound_filtering("mileage", "<=", "INT8", max_mileage_idx),
            min_price_filtering =
                bound_filtering("price", ">=", "NUMERIC", min_price_idx),
            max_price_filtering =
                bound_filtering("price", "<=", "NUMERIC", max_price_idx),
            featured_filtering = if featured_only { "AND featured " } else { "" },
            discounted_filtering =
                if discounted_only { "AND discount > 0 " } else { "" },
            ordering = sorting.into_iter().format_with("", |s, f| {
                let column = match s.field {
                    Field::Price => "price",
                    Field::CreatedAt => "created_at",
                    Field::Mileage => "mileage",
                };
                f(&format_args!("{column} {},", s.order.sql()))
            }),
        );

        self.query(sql.as_str(), &ps)
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(decode)
            .collect::<Result<_, _>>()
            .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Insert<Vehicle>> for Postgres<C>
where
    C: Connection,
{
    type Ok = read::vehicle::IsInserted;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(vehicle): Insert<Vehicle>,
    ) -> Result<Self::Ok, Self::Err> {
        let sql = format!(
            "INSERT INTO vehicles ({COLUMNS}) \
             VALUES (\
                 $1::VARCHAR, $2::VARCHAR, $3::VARCHAR, $4::VARCHAR, \
                 $5::VARCHAR, $6::VARCHAR, \
                 $7::INT4, $8::INT8, $9::NUMERIC, $10::NUMERIC, \
                 $11::VARCHAR, \
                 $12::VARCHAR, $13::VARCHAR, $14::VARCHAR, $15::VARCHAR, \
                 $16::VARCHAR, \
                 $17::JSONB, $18::VARCHAR, $19::JSONB, $20::JSONB, \
                 $21::JSONB, \
                 $22::BOOL, $23::JSONB, $24::JSONB, \
                 $25::INT8, $26::TIMESTAMPTZ, $27::TIMESTAMPTZ\
             ) \
             ON CONFLICT (stock_id) DO NOTHING",
        );
        let params = Params::of(&vehicle);
        self.exec(sql.as_str(), &params.all())
            .await
            .map_err(tracerr::wrap!())
            .map(|n| read::vehicle::IsInserted(n > 0))
    }
}

impl<C> Database<Update<Vehicle>> for Postgres<C>
where
    C: Connection,
{
    type Ok = read::vehicle::IsUpdated;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(vehicle): Update<Vehicle>,
    ) -> Result<Self::Ok, Self::Err> {
        // Only the row of the preceding revision is replaced, so a concurrent
        // modification leaves nothing to update.
        const SQL: &str = "\
            UPDATE vehicles \
            SET brand = $2::VARCHAR, \
                model = $3::VARCHAR, \
                version = $4::VARCHAR, \
                sale_type = $5::VARCHAR, \
                fuel_type = $6::VARCHAR, \
                year = $7::INT4, \
                mileage = $8::INT8, \
                price = $9::NUMERIC, \
                discount = $10::NUMERIC, \
                currency = $11::VARCHAR, \
                city = $12::VARCHAR, \
                branch = $13::VARCHAR, \
                transmission = $14::VARCHAR, \
                drivetrain = $15::VARCHAR, \
                warranty = $16::VARCHAR, \
                images = $17::JSONB, \
                cover_image = $18::VARCHAR, \
                imperfection_images = $19::JSONB, \
                equipment = $20::JSONB, \
                features = $21::JSONB, \
                featured = $22::BOOL, \
                status = $23::JSONB, \
                reservations = $24::JSONB, \
                revision = $25::INT8, \
                updated_at = $27::TIMESTAMPTZ \
            WHERE stock_id = $1::VARCHAR \
              AND revision = $25::INT8 - 1 \
              AND created_at = $26::TIMESTAMPTZ";
        let params = Params::of(&vehicle);
        self.exec(SQL, &params.all())
            .await
            .map_err(tracerr::wrap!())
            .map(|n| read::vehicle::IsUpdated(n > 0))
    }
}

impl<C> Database<Delete<By<Vehicle, StockId>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = read::vehicle::IsDeleted;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Vehicle, StockId>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let stock_id: StockId = by.into_inner();

        const SQL: &str = "\
            DELETE FROM vehicles \
            WHERE stock_id = $1::VARCHAR";
        self.exec(SQL, &[&stock_id])
            .await
            .map_err(tracerr::wrap!())
            .map(|n| read::vehicle::IsDeleted(n > 0))
    }
}

impl<C> Database<Lock<By<Vehicle, StockId>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Vehicle, StockId>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let stock_id: StockId = by.into_inner();

        const SQL: &str = "\
            SELECT stock_id \
            FROM vehicles \
            WHERE stock_id = $1::VARCHAR \
            FOR UPDATE";
        self.query(SQL, &[&stock_id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Lock<By<Vehicle, Prefix>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Vehicle, Prefix>>,
    ) -> Result<Self::Ok, Self::Err> {
        let key = format!("vehicles:{}", by.into_inner());

        // Released automatically once the transaction ends.
        const SQL: &str = "\
            SELECT pg_advisory_xact_lock(hashtext($1::VARCHAR))";
        self.query(SQL, &[&key])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

/// SQL parameters of a [`Vehicle`] in the order of [`COLUMNS`].
struct Params<'a> {
    /// [`Vehicle`] the parameters are taken from.
    vehicle: &'a Vehicle,

    /// [`Year`] as `INT4`.
    year: i32,

    /// [`Mileage`] as `INT8`.
    mileage: i64,

    /// JSON documents of the [`Vehicle`].
    images: Json<&'a Vec<String>>,
    imperfection_images: Json<&'a Vec<String>>,
    equipment: Json<&'a [String]>,
    features: Json<&'a Features>,
    status: Json<&'a Status>,
    reservations: Json<&'a Vec<Reservation>>,
}

impl<'a> Params<'a> {
    /// Converts the [`Params`] of the provided [`Vehicle`].
    fn of(vehicle: &'a Vehicle) -> Self {
        Self {
            vehicle,
            year: i32::from(u16::from(vehicle.year)),
            mileage: i64::from(u32::from(vehicle.mileage)),
            images: Json(&vehicle.images),
            imperfection_images: Json(&vehicle.imperfection_images),
            equipment: Json(vehicle.equipment.as_ref()),
            features: Json(&vehicle.features),
            status: Json(&vehicle.status),
            reservations: Json(&vehicle.reservations),
        }
    }

    /// Lists these [`Params`] as positional SQL parameters.
    fn all(&self) -> [&(dyn ToSql + Sync); 27] {
        let v = self.vehicle;
        [
            &v.stock_id,
            &v.brand,
            &v.model,
            &v.version,
            &v.sale_type,
            &v.fuel_type,
            &self.year,
            &self.mileage,
            &v.price,
            &v.discount,
            &v.currency,
            &v.city,
            &v.branch,
            &v.transmission,
            &v.drivetrain,
            &v.warranty,
            &self.images,
            &v.cover_image,
            &self.imperfection_images,
            &self.equipment,
            &self.features,
            &v.featured,
            &self.status,
            &self.reservations,
            &v.revision,
            &v.created_at,
            &v.updated_at,
        ]
    }
}
