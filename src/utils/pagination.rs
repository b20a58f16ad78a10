//! Utilidad de paginación para listas

use serde::Serialize;

/// Parámetros de paginación ya saneados
#[derive(Debug, Clone, Copy)]
pub struct Paging {
    pub page: u32,
    pub limit: u32,
}

impl Paging {
    /// Sanear page/limit crudos del query string.
    /// page >= 1; limit en 1..=100, default 10.
    pub fn clamp(page: Option<u32>, limit: Option<u32>) -> Self {
        let page = match page {
            Some(p) if p > 0 => p,
            _ => 1,
        };
        let limit = match limit {
            Some(l) if l > 0 && l <= 100 => l,
            _ => 10,
        };
        Self { page, limit }
    }

    pub fn skip(&self) -> usize {
        ((self.page - 1) * self.limit) as usize
    }
}

/// Objeto de paginación para la respuesta
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationData {
    pub total: usize,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
    pub has_next_page: bool,
    pub has_prev_page: bool,
    pub next_page: Option<u32>,
    pub prev_page: Option<u32>,
}

pub fn pagination_data(total: usize, paging: Paging) -> PaginationData {
    let total_pages = ((total as f64) / (paging.limit as f64)).ceil() as u32;
    let has_next_page = paging.page < total_pages;
    let has_prev_page = paging.page > 1;

    PaginationData {
        total,
        page: paging.page,
        limit: paging.limit,
        total_pages,
        has_next_page,
        has_prev_page,
        next_page: has_next_page.then(|| paging.page + 1),
        prev_page: has_prev_page.then(|| paging.page - 1),
    }
}
