use aria_core::domain::customer::CustomerListing;
use aria_core::domain::inventory::InventorySnapshot;
use aria_core::domain::order::OrderListing;
use aria_core::domain::product::TopProduct;
use aria_core::domain::sales::SalesSummary;
use aria_core::domain::visualization::{
    Chart, ChartKind, ChartPoint, Table, Visualization, VisualizationKind,
};
use aria_core::money::format_currency;

use crate::fetch::{Fetched, FetchedData};

const PRODUCT_LABEL_CHARS: usize = 20;
const INVENTORY_LABEL_CHARS: usize = 15;
const INVENTORY_CHART_ITEMS: usize = 10;
const MISSING: &str = "-";

/// Builds the chart or table for a fetch. Input order is kept as is.
pub fn shape(fetched: &Fetched) -> Option<Visualization> {
    let data = fetched.outcome.as_ref().ok()?;
    match (data, fetched.visualization?) {
        (FetchedData::Sales(sales), VisualizationKind::LineChart) => {
            Some(Visualization::Chart(sales_chart(sales)))
        }
        (FetchedData::TopProducts(products), VisualizationKind::BarChart) => {
            Some(Visualization::Chart(products_chart(products)))
        }
        (FetchedData::Inventory(inventory), VisualizationKind::BarChart) => {
            Some(Visualization::Chart(inventory_chart(inventory)))
        }
        (FetchedData::Customers(customers), VisualizationKind::Table) => {
            Some(Visualization::Table(customers_table(customers)))
        }
        (FetchedData::RecentOrders(orders), VisualizationKind::Table) => {
            Some(Visualization::Table(orders_table(orders)))
        }
        _ => None,
    }
}

pub fn sales_chart(sales: &SalesSummary) -> Chart {
    Chart {
        kind: ChartKind::Line,
        data: sales
            .daily
            .iter()
            .map(|day| ChartPoint { category: day.date.clone(), value: day.total })
            .collect(),
        title: Some("Tendencia de Ventas".to_string()),
    }
}

pub fn products_chart(products: &[TopProduct]) -> Chart {
    Chart {
        kind: ChartKind::Bar,
        data: products
            .iter()
            .map(|product| ChartPoint {
                category: truncate_label(&product.name, PRODUCT_LABEL_CHARS),
                value: product.quantity,
            })
            .collect(),
        title: Some("Productos Más Vendidos".to_string()),
    }
}

pub fn inventory_chart(inventory: &InventorySnapshot) -> Chart {
    Chart {
        kind: ChartKind::Bar,
        data: inventory
            .items
            .iter()
            .take(INVENTORY_CHART_ITEMS)
            .map(|item| ChartPoint {
                category: truncate_label(&item.name, INVENTORY_LABEL_CHARS),
                value: item.quantity,
            })
            .collect(),
        title: Some("Niveles de Inventario".to_string()),
    }
}

pub fn customers_table(customers: &CustomerListing) -> Table {
    Table {
        headers: headers(&["Nombre", "Email", "Teléfono", "Ciudad"]),
        rows: customers
            .customers
            .iter()
            .map(|customer| {
                vec![
                    customer.name.clone(),
                    or_missing(customer.email.as_deref()),
                    or_missing(customer.phone.as_deref()),
                    or_missing(customer.city.as_deref()),
                ]
            })
            .collect(),
        title: Some("Lista de Clientes".to_string()),
    }
}

pub fn orders_table(orders: &OrderListing) -> Table {
    Table {
        headers: headers(&["Orden", "Fecha", "Cliente", "Total", "Estado"]),
        rows: orders
            .orders
            .iter()
            .map(|order| {
                vec![
                    order.name.clone(),
                    order.date().unwrap_or_default().to_string(),
                    or_missing(order.customer.as_deref()),
                    format_currency(order.amount_total),
                    order.state.label().to_string(),
                ]
            })
            .collect(),
        title: Some("Órdenes Recientes".to_string()),
    }
}

fn headers(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| (*name).to_string()).collect()
}

fn or_missing(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => MISSING.to_string(),
    }
}

fn truncate_label(label: &str, max_chars: usize) -> String {
    label.chars().take(max_chars).collect()
}
