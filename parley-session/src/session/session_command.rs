/// Команды, поступающие в сессию от пользовательского интерфейса.
#[derive(Debug)]
pub enum SessionCommand {
    /// Переключить микрофон.
    ToggleMute,

    /// Переключить камеру.
    ToggleCamera,

    /// Показать экран вместо камеры.
    StartScreenShare,

    /// Убрать показ экрана и вернуть камеру.
    StopScreenShare,

    /// Завершить сессию и комнату.
    EndSession,
}
