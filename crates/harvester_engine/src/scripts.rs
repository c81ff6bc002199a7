//! Page-side scripts run through [`PageDriver::evaluate`](crate::PageDriver::evaluate).
//!
//! Each script is a function expression; arguments are passed positionally.

/// `(tableSelector, markerAttr, markerToken)`. Tags the nearest scrollable
/// ancestor of the table (the table itself included, `body` excluded), or
/// failing that the first scrollable descendant in document order.
///
/// Returns `{found: true, origin: "ancestor" | "descendant"}` or
/// `{found: false, reason: "no-table" | "no-scroller"}`.
pub const RESOLVE_SCROLLER: &str = r#"(sel, attr, token) => {
    const table = document.querySelector(sel);
    if (!table) return { found: false, reason: 'no-table' };
    for (const old of document.querySelectorAll('[' + attr + ']')) {
        old.removeAttribute(attr);
    }
    const scrollable = (el) => {
        const oy = getComputedStyle(el).overflowY;
        return (oy === 'auto' || oy === 'scroll') && el.scrollHeight > el.clientHeight + 1;
    };
    let node = table;
    while (node && node !== document.body) {
        if (scrollable(node)) {
            node.setAttribute(attr, token);
            return { found: true, origin: 'ancestor' };
        }
        node = node.parentElement;
    }
    for (const d of table.querySelectorAll('*')) {
        if (scrollable(d)) {
            d.setAttribute(attr, token);
            return { found: true, origin: 'descendant' };
        }
    }
    return { found: false, reason: 'no-scroller' };
}"#;

/// `(markerAttr, markerToken)`. Moves the tagged scroller down by one
/// viewport height, clamped to the maximum offset.
///
/// Returns `{ok: true, prev, now, max}` or `{ok: false, reason: "no-scroller"}`
/// when the tagged element is gone or no longer scrollable.
pub const ADVANCE_SCROLLER: &str = r#"(attr, token) => {
    const s = document.querySelector('[' + attr + '="' + CSS.escape(token) + '"]');
    if (!s || !s.isConnected || s.scrollHeight <= s.clientHeight + 1) {
        return { ok: false, reason: 'no-scroller' };
    }
    const prev = s.scrollTop;
    const max = s.scrollHeight - s.clientHeight;
    const next = Math.min(prev + s.clientHeight, max);
    s.scrollTop = next;
    return { ok: true, prev, now: s.scrollTop, max };
}"#;

/// `(markerAttr, markerToken)`. Scrolls the tagged scroller back to the top.
/// Returns `{ok: bool}`.
pub const RESET_SCROLLER: &str = r#"(attr, token) => {
    const s = document.querySelector('[' + attr + '="' + CSS.escape(token) + '"]');
    if (!s) return { ok: false };
    s.scrollTop = 0;
    return { ok: true };
}"#;

/// `(tableSelector)`. Reads every laid-out body row as an array of trimmed
/// cell texts. Falls back to ARIA rows when the table has no `tbody tr`.
/// Returns `null` when the table is missing.
pub const EXTRACT_ROWS: &str = r#"(sel) => {
    const table = document.querySelector(sel);
    if (!table) return null;
    let rows = Array.from(table.querySelectorAll('tbody tr'));
    let cellSel = 'td';
    if (rows.length === 0) {
        rows = Array.from(table.querySelectorAll('[role=row]'))
            .filter(r => !r.querySelector('[role=columnheader]'));
        cellSel = '[role=cell], [role=gridcell]';
    }
    return rows
        .filter(r => r.offsetParent !== null || getComputedStyle(r).position === 'fixed')
        .map(r => Array.from(r.querySelectorAll(cellSel)).map(c => (c.innerText || '').trim()));
}"#;

/// `()`. Visible text of the whole page.
pub const PAGE_TEXT: &str = r#"() => document.body ? document.body.innerText : ''"#;
