use kitchen_queue::application::QueueService;
use kitchen_queue::shared::metrics::METRICS;

// 本文件只有一个测试，全局计数器不受其他测试干扰
#[tokio::test]
async fn test_selected_completion_counts_as_completion() {
    let (service, handle) = QueueService::new();
    tokio::spawn(service.run());

    for line in ["ADD,1,Burger,10", "ADD,2,Fries,5", "VIP,3,Salad,1"] {
        handle.handle_line(line.to_string()).await.unwrap();
    }

    let completions = METRICS.completions_total.get();
    let cancellations = METRICS.cancellations_total.get();

    let outcome = handle.complete_selected(2).await.unwrap().unwrap();
    assert_eq!(outcome.removed.unwrap().id, 2);
    assert_eq!(METRICS.completions_total.get(), completions + 1);
    assert_eq!(METRICS.cancellations_total.get(), cancellations);

    handle.handle_line("CANCEL,1".to_string()).await.unwrap();
    assert_eq!(METRICS.completions_total.get(), completions + 1);
    assert_eq!(METRICS.cancellations_total.get(), cancellations + 1);

    // 不存在的订单不计数
    assert!(handle.complete_selected(2).await.unwrap().is_err());
    assert_eq!(METRICS.completions_total.get(), completions + 1);
}
