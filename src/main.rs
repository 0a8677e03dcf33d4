use signalwire_log::{LogLevel, Locale, Logger, debug, error, format_bool, format_f64, info, notice, warning};

fn main() {
    let options = Logger::init()
        .sender_name("order-api")
        .sender_type("service")
        // Color-coded lines on stderr at Debug and above.
        .with_console(LogLevel::Debug)
        // A bounded in-memory ring, readable back by any holder of a
        // `CollectorReceiver` clone taken before `build()`.
        .with_collector(500, LogLevel::Information)
        // A standalone HTML file, for attaching a run's log to a report.
        .with_html_file("order-api.log.html", LogLevel::Warning);

    // Taken before `build()`, this clone shares the same backing storage as
    // the copy that gets wired into the dispatcher.
    let recent = options.collector().expect("collector configured above");

    let logger = options.build();

    debug!("app started");
    info!("server listening on 0.0.0.0:8080");

    notice!("<Bold><Yellow>order queue<Reset> backlog crossed 1000 items");

    for id in 1..=3 {
        info!(format!("processing order {id}"));
    }

    // Locale-aware interpolation happens at the call site, before the
    // string reaches `LogText::parse`.
    let total = format_f64(1284.5, Locale::DeDe);
    let expedited = format_bool(true);
    info!(format!("order total {total} EUR, expedited={expedited}"));

    warning!("<Yellow>retrying<Reset> payment gateway after timeout");
    error!("<Bold><Red>payment gateway unreachable<Reset> after 3 attempts");

    // Wait for every emission above to reach its sinks before exiting.
    logger.flush();
    logger.close();

    println!("collector retained {} messages", recent.item_count());
}
