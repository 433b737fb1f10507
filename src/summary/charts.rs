//! The expense by category pie chart on the dashboard.

use charming::{
    Chart,
    component::{Legend, Title},
    element::{JsFunction, Tooltip, Trigger},
    series::Pie,
};
use maud::{Markup, PreEscaped, html};

use crate::{html::HeadElement, summary::CategoryTotal};

/// The HTML element ID of the pie chart container.
pub const EXPENSE_CHART_ID: &str = "expense-by-category-chart";

/// Build the ECharts configuration for the expense by category pie chart.
pub fn expense_by_category_chart(totals: &[CategoryTotal]) -> Chart {
    let data = totals
        .iter()
        .map(|total| (total.total, total.category.as_str()))
        .collect::<Vec<_>>();

    Chart::new()
        .title(Title::new().text("Expenses by category").left("center"))
        .tooltip(
            Tooltip::new()
                .trigger(Trigger::Item)
                .value_formatter(currency_formatter()),
        )
        .legend(Legend::new().bottom("1%"))
        .series(
            Pie::new()
                .name("Expenses")
                .radius("60%")
                .center(vec!["50%", "50%"])
                .data(data),
        )
}

/// The container the chart is drawn in.
pub fn chart_container() -> Markup {
    html! {
        div id=(EXPENSE_CHART_ID) class="min-h-[380px] w-full rounded dark:bg-gray-100" {}
    }
}

/// A script that draws `chart` in its container once the page has loaded.
pub fn chart_script(chart: &Chart) -> HeadElement {
    let script = format!(
        r#"document.addEventListener('DOMContentLoaded', function() {{
            const chartDom = document.getElementById("{EXPENSE_CHART_ID}");
            const chart = echarts.init(chartDom);
            chart.setOption({chart});

            window.addEventListener('resize', chart.resize);

            const darkModeMediaQuery = window.matchMedia('(prefers-color-scheme: dark)');
            const updateTheme = () => {{
                chart.setTheme(darkModeMediaQuery.matches ? 'dark' : 'default');
            }};
            darkModeMediaQuery.addEventListener('change', updateTheme);
            updateTheme();
        }});"#
    );

    HeadElement::ScriptSource(PreEscaped(script))
}

fn currency_formatter() -> JsFunction {
    JsFunction::new_with_args(
        "number",
        "const currencyFormatter = new Intl.NumberFormat('en-US', {
              style: 'currency',
              currency: 'USD'
            });
            return (number) ? currencyFormatter.format(number) : \"-\";",
    )
}
