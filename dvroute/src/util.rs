use crate::concepts::route::Metric;

/// Adds a link cost to a metric. Unreachable stays unreachable, finite sums are not clamped to INFINITY.
///
/// # Examples
///
/// ```
/// use dvroute::concepts::route::Metric;
/// use dvroute::util::sum_inf;
/// assert_eq!(sum_inf(Metric::Finite(3), 5), Metric::Finite(8));
/// assert_eq!(sum_inf(Metric::Finite(14), 5), Metric::Finite(19));
/// assert_eq!(sum_inf(Metric::Unreachable, 1), Metric::Unreachable);
/// ```
pub fn sum_inf(metric: Metric, link_cost: u32) -> Metric {
    match metric {
        Metric::Finite(cost) => Metric::Finite(cost.saturating_add(link_cost)),
        Metric::Unreachable => Metric::Unreachable,
    }
}
